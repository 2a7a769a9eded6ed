//! Diesel schema for tracker persistence.

diesel::table! {
    /// Job positions workers can hold.
    positions (id) {
        /// Position identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// Task categories.
    task_types (id) {
        /// Task type identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// Workers, who double as the authenticated users.
    workers (id) {
        /// Worker identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 150]
        username -> Varchar,
        /// Given name, possibly empty.
        #[max_length = 150]
        first_name -> Varchar,
        /// Family name, possibly empty.
        #[max_length = 150]
        last_name -> Varchar,
        /// Held position, cleared when the position is deleted.
        position_id -> Nullable<Uuid>,
        /// Encoded password hash.
        #[max_length = 255]
        password -> Varchar,
    }
}

diesel::table! {
    /// Tasks with unique names.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Unique task name.
        #[max_length = 100]
        name -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Due date and time.
        deadline -> Timestamptz,
        /// Completion flag.
        is_completed -> Bool,
        /// Priority key.
        #[max_length = 10]
        priority -> Varchar,
        /// Board status key.
        #[max_length = 20]
        status -> Varchar,
        /// Task category, deletion restricted while referenced.
        task_type_id -> Uuid,
    }
}

diesel::table! {
    /// Task to worker assignments.
    task_assignees (task_id, worker_id) {
        /// Assigned task.
        task_id -> Uuid,
        /// Assigned worker.
        worker_id -> Uuid,
    }
}

diesel::table! {
    /// Login sessions and their dashboard visit counters.
    sessions (id) {
        /// Session identifier, also the cookie value.
        id -> Uuid,
        /// Authenticated worker.
        worker_id -> Uuid,
        /// Dashboard visits recorded in this session.
        num_visits -> Int8,
        /// Login timestamp.
        created_at -> Timestamptz,
        /// Expiry timestamp.
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Applied schema migrations, shared with the Diesel CLI.
    __diesel_schema_migrations (version) {
        /// Migration version derived from its directory name.
        #[max_length = 50]
        version -> Varchar,
        /// Application timestamp.
        run_on -> Timestamp,
    }
}

diesel::joinable!(workers -> positions (position_id));
diesel::joinable!(tasks -> task_types (task_type_id));
diesel::joinable!(task_assignees -> tasks (task_id));
diesel::joinable!(task_assignees -> workers (worker_id));
diesel::joinable!(sessions -> workers (worker_id));

diesel::allow_tables_to_appear_in_same_query!(
    positions,
    task_types,
    workers,
    tasks,
    task_assignees,
    sessions,
);
