//! Diesel schema for tracker persistence.

diesel::table! {
    /// People who can be assigned tasks.
    users (id) {
        /// Autoincrement key.
        id -> BigInt,
        /// Display name.
        name -> Text,
        /// Soft-delete flag.
        active -> Bool,
    }
}

diesel::table! {
    /// Boards owning tasks.
    boards (id) {
        /// Autoincrement key.
        id -> BigInt,
        /// Board title.
        title -> Text,
        /// Soft-delete flag.
        active -> Bool,
    }
}

diesel::table! {
    /// Tasks with their workflow stage.
    tasks (id) {
        /// Autoincrement key.
        id -> BigInt,
        /// Task title.
        title -> Text,
        /// Task description.
        description -> Text,
        /// Stage code.
        stage -> Text,
        /// Difficulty score.
        difficulty -> Nullable<BigInt>,
        /// Assignee key.
        assigned_user -> Nullable<BigInt>,
        /// Due date (UTC).
        due_date -> Nullable<Timestamp>,
        /// Soft-delete flag.
        active -> Bool,
        /// Owning board key.
        board_id -> BigInt,
    }
}

diesel::joinable!(tasks -> boards (board_id));
diesel::allow_tables_to_appear_in_same_query!(users, boards, tasks);
