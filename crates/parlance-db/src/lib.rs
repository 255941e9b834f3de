//! Storage layer for the Parlance platform.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode
//! initialization, embedded SQL migrations, and the conversation store:
//! user accounts, single- and multi-user conversations, append-only turns,
//! date-range queries, audio-reference aggregation, and the guest-id
//! counter.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process required; WAL
//!   allows concurrent readers alongside the single writer, which matches
//!   the one-append-per-request access pattern.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the server and cannot drift
//!   from the code that depends on it.
//! - **Turns as rows, not arrays**: the hierarchical store this replaces
//!   kept each conversation as one document and rewrote the whole turn
//!   array on append; here a turn is a single INSERT, which removes the
//!   lost-update window on concurrent appends to an existing conversation.

mod conversations;
mod error;
mod migrations;
mod pool;
mod users;

pub use conversations::{
    append_turn, end_multi, end_single, find_open_multi, find_open_single,
    get_all_conversations, get_audio_references, get_conversations_by_date_range,
    get_user_conversations, next_guest_id, now_timestamp, open_or_create_multi,
    open_or_create_single, parse_range_bound,
};
pub use error::StoreError;
pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
pub use users::{
    delete_user, get_all_users, get_user_by_id, get_user_id_by_email, hash_password, is_email,
    login_user, register_user, toggle_admin_status_by_email, update_user, UpdateUserParams,
    UserProfile,
};
