//! Diesel schema for the task table in both historical layouts.
//!
//! Both definitions map onto the same SQL table, `items`. Only one of them
//! matches the live table at any time; the layout strategy decides which.

diesel::table! {
    /// Task rows whose owner lives in `Responsable`.
    #[sql_name = "items"]
    legacy_items (item_id) {
        /// Store-assigned task identifier.
        #[sql_name = "ItemId"]
        item_id -> BigInt,
        /// Task title.
        #[sql_name = "Titre"]
        title -> Text,
        /// Free-form description.
        #[sql_name = "Description"]
        description -> Nullable<Text>,
        /// Task status.
        #[sql_name = "Statut"]
        status -> Text,
        /// Due date as `YYYY-MM-DD`.
        #[sql_name = "DateLimite"]
        due_date -> Nullable<Text>,
        /// Task priority.
        #[sql_name = "Priorite"]
        priority -> Text,
        /// Owner key.
        #[sql_name = "Responsable"]
        owner -> Text,
    }
}

diesel::table! {
    /// Task rows whose owner lives in `UserId`, mirrored into `UserEmail`.
    #[sql_name = "items"]
    current_items (item_id) {
        /// Store-assigned task identifier.
        #[sql_name = "ItemId"]
        item_id -> BigInt,
        /// Task title.
        #[sql_name = "Titre"]
        title -> Text,
        /// Free-form description.
        #[sql_name = "Description"]
        description -> Nullable<Text>,
        /// Task status.
        #[sql_name = "Statut"]
        status -> Text,
        /// Due date as `YYYY-MM-DD`.
        #[sql_name = "DateLimite"]
        due_date -> Nullable<Text>,
        /// Task priority.
        #[sql_name = "Priorite"]
        priority -> Text,
        /// Owner key.
        #[sql_name = "UserId"]
        owner -> Text,
        /// Copy of the owner key kept for older readers.
        #[sql_name = "UserEmail"]
        owner_email -> Nullable<Text>,
    }
}
