//! Conversation and turn storage.
//!
//! Single-user conversations are keyed by their owner id (a user id or a
//! guest id); multi-user conversations are keyed by their exact participant
//! set. At most one conversation per key may be open (`ended = 0`) at a
//! time, and appends always target the most recently started open one.
//!
//! Appending a turn is a single INSERT inside the turns table rather than a
//! read-modify-write of a whole conversation record, so two concurrent
//! appends to the same conversation cannot clobber each other. The
//! find-or-create step is still racy on its own; callers serialize it per
//! conversation key (see the orchestrator's lock map).

use crate::error::StoreError;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use parlance_types::{AudioRefs, Conversation, ConversationKind, Turn};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Timestamp format used throughout the conversations tables.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in the stored format.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a date-range bound. Accepts a bare date (`2026-08-01`) or a full
/// timestamp (`2026-08-01 13:30:00`, `T` separator also tolerated). Bare
/// dates expand to start-of-day for `end_of_day = false` and end-of-day
/// otherwise, keeping range queries inclusive on both bounds.
pub fn parse_range_bound(value: &str, end_of_day: bool) -> Result<NaiveDateTime, StoreError> {
    let trimmed = value.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let time = if end_of_day {
            chrono::NaiveTime::from_hms_opt(23, 59, 59).expect("valid time")
        } else {
            chrono::NaiveTime::from_hms_opt(0, 0, 0).expect("valid time")
        };
        return Ok(date.and_time(time));
    }

    Err(StoreError::Validation(format!(
        "Invalid date '{trimmed}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS."
    )))
}

/// Finds the most recently started open single-user conversation for an
/// owner, or creates one with no turns. Returns the conversation id.
pub fn open_or_create_single(conn: &Connection, owner_id: &str) -> Result<String, StoreError> {
    if owner_id.trim().is_empty() {
        return Err(StoreError::Validation(
            "An owner id must be provided.".to_string(),
        ));
    }

    if let Some(id) = find_open_single(conn, owner_id)? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO conversations (id, kind, owner_user_id, started_at, ended)
         VALUES (?1, 'single', ?2, ?3, 0)",
        params![id, owner_id, now_timestamp()],
    )?;
    Ok(id)
}

/// Finds the open multi-user conversation whose participant set equals the
/// given set (order-independent), or creates one. Returns the conversation
/// id.
pub fn open_or_create_multi(conn: &Connection, participants: &[String]) -> Result<String, StoreError> {
    if participants.is_empty() {
        return Err(StoreError::Validation(
            "At least one user ID must be provided.".to_string(),
        ));
    }

    if let Some(id) = find_open_multi(conn, participants)? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO conversations (id, kind, owner_user_id, started_at, ended)
         VALUES (?1, 'multi', NULL, ?2, 0)",
        params![id, now_timestamp()],
    )?;
    // The set comparison above de-duplicates, so duplicate ids in the input
    // must not break the primary key here.
    let unique: BTreeSet<&String> = participants.iter().collect();
    for user_id in unique {
        tx.execute(
            "INSERT INTO conversation_participants (conversation_id, user_id) VALUES (?1, ?2)",
            params![id, user_id],
        )?;
    }
    tx.commit()?;
    Ok(id)
}

/// Returns the open single-user conversation id for an owner, if any.
pub fn find_open_single(conn: &Connection, owner_id: &str) -> Result<Option<String>, StoreError> {
    let id = conn
        .query_row(
            "SELECT id FROM conversations
             WHERE kind = 'single' AND owner_user_id = ?1 AND ended = 0
             ORDER BY started_at DESC, rowid DESC LIMIT 1",
            [owner_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Returns the open multi-user conversation id for an exact participant
/// set, if any.
pub fn find_open_multi(
    conn: &Connection,
    participants: &[String],
) -> Result<Option<String>, StoreError> {
    let wanted: BTreeSet<String> = participants.iter().cloned().collect();

    let mut stmt = conn.prepare(
        "SELECT id FROM conversations
         WHERE kind = 'multi' AND ended = 0
         ORDER BY started_at DESC, rowid DESC",
    )?;
    let ids = stmt.query_map([], |row| row.get::<_, String>(0))?;

    for id in ids {
        let id = id?;
        let members: BTreeSet<String> = load_participants(conn, &id)?.into_iter().collect();
        if members == wanted {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Appends a turn to a conversation.
///
/// Turns with an empty or whitespace-only prompt are silently discarded —
/// a no-op, not an error.
pub fn append_turn(conn: &Connection, conversation_id: &str, turn: &Turn) -> Result<(), StoreError> {
    if !turn.is_persistable() {
        tracing::debug!(conversation_id, "discarding turn with blank prompt");
        return Ok(());
    }

    let inserted = conn.execute(
        "INSERT INTO turns (conversation_id, prompt_text, answer_text, prompt_audio_url, answer_audio_url)
         SELECT ?1, ?2, ?3, ?4, ?5
         WHERE EXISTS (SELECT 1 FROM conversations WHERE id = ?1)",
        params![
            conversation_id,
            turn.prompt_text,
            turn.answer_text,
            turn.prompt_audio_url,
            turn.answer_audio_url,
        ],
    )?;
    if inserted == 0 {
        return Err(StoreError::NotFound(format!(
            "Conversation {conversation_id} not found."
        )));
    }
    Ok(())
}

/// Ends the open single-user conversation for an owner.
///
/// Returns the ended conversation id, or `None` (with a warning) when the
/// owner has no open conversation — ending twice is a benign no-op.
pub fn end_single(conn: &Connection, owner_id: &str) -> Result<Option<String>, StoreError> {
    let Some(id) = find_open_single(conn, owner_id)? else {
        tracing::warn!(owner_id, "no ongoing conversation to end");
        return Ok(None);
    };
    mark_ended(conn, &id)?;
    Ok(Some(id))
}

/// Ends the open multi-user conversation for an exact participant set.
/// Same no-op semantics as [`end_single`].
pub fn end_multi(conn: &Connection, participants: &[String]) -> Result<Option<String>, StoreError> {
    let Some(id) = find_open_multi(conn, participants)? else {
        tracing::warn!(?participants, "no ongoing multi-user conversation to end");
        return Ok(None);
    };
    mark_ended(conn, &id)?;
    Ok(Some(id))
}

fn mark_ended(conn: &Connection, conversation_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE conversations SET ended = 1, ended_at = ?1 WHERE id = ?2",
        params![now_timestamp(), conversation_id],
    )?;
    Ok(())
}

fn load_participants(conn: &Connection, conversation_id: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM conversation_participants WHERE conversation_id = ?1 ORDER BY user_id",
    )?;
    let rows = stmt.query_map([conversation_id], |row| row.get(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load_turns(conn: &Connection, conversation_id: &str) -> Result<Vec<Turn>, StoreError> {
    // Blank-prompt turns are never inserted, but the read side filters too
    // so query results stay clean even against imported legacy data.
    let mut stmt = conn.prepare(
        "SELECT prompt_text, answer_text, prompt_audio_url, answer_audio_url
         FROM turns
         WHERE conversation_id = ?1 AND TRIM(prompt_text) <> ''
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([conversation_id], |row| {
        Ok(Turn {
            prompt_text: row.get(0)?,
            answer_text: row.get(1)?,
            prompt_audio_url: row.get(2)?,
            answer_audio_url: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load_conversation_rows(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<Conversation>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut headers = Vec::new();
    for row in rows {
        headers.push(row?);
    }

    let mut conversations = Vec::new();
    for (id, kind, owner, started_at, ended, ended_at) in headers {
        let kind = ConversationKind::from_str_opt(&kind).unwrap_or_default();
        let participants = match kind {
            ConversationKind::Multi => load_participants(conn, &id)?,
            ConversationKind::Single => Vec::new(),
        };
        let turns = load_turns(conn, &id)?;
        conversations.push(Conversation {
            id,
            kind,
            owner_user_id: owner,
            participants,
            turns,
            started_at,
            ended,
            ended_at,
        });
    }
    Ok(conversations)
}

const CONVERSATION_COLUMNS: &str = "id, kind, owner_user_id, started_at, ended, ended_at";

/// Returns every conversation a user can see: single-user conversations
/// they own plus multi-user conversations they participate in, oldest
/// first.
///
/// # Errors
///
/// `NotFound` when the user has no conversations at all.
pub fn get_user_conversations(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Conversation>, StoreError> {
    let sql = format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations
         WHERE (kind = 'single' AND owner_user_id = ?1)
            OR id IN (SELECT conversation_id FROM conversation_participants WHERE user_id = ?1)
         ORDER BY started_at ASC, rowid ASC"
    );
    let conversations = load_conversation_rows(conn, &sql, &[&user_id])?;
    if conversations.is_empty() {
        return Err(StoreError::NotFound(
            "No conversations found for this user.".to_string(),
        ));
    }
    Ok(conversations)
}

/// Returns every conversation in both namespaces, oldest first.
pub fn get_all_conversations(conn: &Connection) -> Result<Vec<Conversation>, StoreError> {
    let sql = format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations ORDER BY started_at ASC, rowid ASC"
    );
    let conversations = load_conversation_rows(conn, &sql, &[])?;
    if conversations.is_empty() {
        return Err(StoreError::NotFound(
            "No conversations found in the database.".to_string(),
        ));
    }
    Ok(conversations)
}

/// Returns conversations whose start time falls within `[start, end]`
/// (inclusive). With a user id the scope is that user's conversations in
/// both namespaces; without one, everything.
pub fn get_conversations_by_date_range(
    conn: &Connection,
    user_id: Option<&str>,
    start: &str,
    end: &str,
) -> Result<Vec<Conversation>, StoreError> {
    let start = parse_range_bound(start, false)?;
    let end = parse_range_bound(end, true)?;
    if end < start {
        return Err(StoreError::Validation(
            "End date must not precede start date.".to_string(),
        ));
    }

    let all = match user_id {
        Some(uid) => get_user_conversations(conn, uid),
        None => get_all_conversations(conn),
    };
    let all = match all {
        Ok(list) => list,
        // An empty store yields an empty range result, reported as NotFound
        // below with the range-specific message.
        Err(StoreError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    let mut matched = Vec::new();
    for conversation in all {
        let Ok(started) = NaiveDateTime::parse_from_str(&conversation.started_at, TIMESTAMP_FORMAT)
        else {
            tracing::warn!(
                conversation_id = %conversation.id,
                started_at = %conversation.started_at,
                "skipping conversation with unparseable start time"
            );
            continue;
        };
        if started >= start && started <= end {
            matched.push(conversation);
        }
    }

    if matched.is_empty() {
        return Err(StoreError::NotFound(
            "No conversations found for the given range.".to_string(),
        ));
    }
    Ok(matched)
}

/// Returns the prompt/answer audio URL pairs for stored turns.
///
/// Four selection modes: no filter (everything), user only (that user's
/// conversations in both namespaces), user + conversation, and conversation
/// only.
pub fn get_audio_references(
    conn: &Connection,
    user_id: Option<&str>,
    conversation_id: Option<&str>,
) -> Result<Vec<AudioRefs>, StoreError> {
    let base = "SELECT t.prompt_audio_url, t.answer_audio_url
         FROM turns t JOIN conversations c ON c.id = t.conversation_id";
    let (sql, params): (String, Vec<&dyn rusqlite::types::ToSql>) =
        match (user_id, conversation_id) {
            (None, None) => (format!("{base} ORDER BY t.id ASC"), vec![]),
            (Some(_), None) => (
                format!(
                    "{base}
                     WHERE (c.kind = 'single' AND c.owner_user_id = ?1)
                        OR c.id IN (SELECT conversation_id FROM conversation_participants
                                    WHERE user_id = ?1)
                     ORDER BY t.id ASC"
                ),
                vec![&user_id],
            ),
            (Some(_), Some(_)) => (
                format!(
                    "{base}
                     WHERE c.id = ?2
                       AND ((c.kind = 'single' AND c.owner_user_id = ?1)
                            OR c.id IN (SELECT conversation_id FROM conversation_participants
                                        WHERE user_id = ?1))
                     ORDER BY t.id ASC"
                ),
                vec![&user_id, &conversation_id],
            ),
            (None, Some(_)) => (
                format!("{base} WHERE c.id = ?1 ORDER BY t.id ASC"),
                vec![&conversation_id],
            ),
        };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok(AudioRefs {
            prompt_audio_url: row.get(0)?,
            answer_audio_url: row.get(1)?,
        })
    })?;

    let mut refs = Vec::new();
    for row in rows {
        refs.push(row?);
    }
    Ok(refs)
}

/// Allocates the next guest id (`Guest-<n>`).
///
/// The counter row is seeded on first use from the highest `Guest-<n>`
/// owner already present in the conversations table, then bumped atomically
/// inside a transaction — concurrent allocations cannot hand out the same
/// number. Callers cache the returned id for the session.
pub fn next_guest_id(conn: &Connection) -> Result<String, StoreError> {
    let tx = conn.unchecked_transaction()?;

    let last: Option<u64> = tx
        .query_row("SELECT last_guest FROM guest_counter WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    let next = match last {
        Some(n) => {
            tx.execute("UPDATE guest_counter SET last_guest = ?1 WHERE id = 1", [n + 1])?;
            n + 1
        }
        None => {
            let seed = highest_existing_guest_number(&tx)? + 1;
            tx.execute(
                "INSERT INTO guest_counter (id, last_guest) VALUES (1, ?1)",
                [seed],
            )?;
            seed
        }
    };

    tx.commit()?;
    Ok(parlance_types::guest_id(next))
}

fn highest_existing_guest_number(conn: &Connection) -> Result<u64, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT owner_user_id FROM conversations
         WHERE owner_user_id LIKE 'Guest-%'",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut highest = 0;
    for row in rows {
        if let Some(n) = parlance_types::parse_guest_number(&row?) {
            highest = highest.max(n);
        }
    }
    Ok(highest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        run_migrations(&conn).expect("migrations should succeed");
        conn
    }

    fn turn(prompt: &str, answer: &str) -> Turn {
        Turn {
            prompt_text: prompt.to_string(),
            answer_text: answer.to_string(),
            prompt_audio_url: format!("http://media/{prompt}.mp3"),
            answer_audio_url: if answer.is_empty() {
                String::new()
            } else {
                format!("http://media/{answer}.mp3")
            },
        }
    }

    #[test]
    fn single_user_reuses_open_conversation() {
        let conn = test_conn();
        let first = open_or_create_single(&conn, "alice").unwrap();
        let second = open_or_create_single(&conn, "alice").unwrap();
        assert_eq!(first, second, "open conversation should be reused");
    }

    #[test]
    fn ending_creates_a_fresh_conversation_next_time() {
        let conn = test_conn();
        let first = open_or_create_single(&conn, "alice").unwrap();
        append_turn(&conn, &first, &turn("hej", "")).unwrap();

        let ended = end_single(&conn, "alice").unwrap();
        assert_eq!(ended.as_deref(), Some(first.as_str()));

        let third = open_or_create_single(&conn, "alice").unwrap();
        assert_ne!(first, third, "a new conversation starts after ending");
    }

    #[test]
    fn ending_twice_is_a_no_op() {
        let conn = test_conn();
        open_or_create_single(&conn, "alice").unwrap();
        assert!(end_single(&conn, "alice").unwrap().is_some());
        assert!(end_single(&conn, "alice").unwrap().is_none());
    }

    #[test]
    fn ending_preserves_turns() {
        let conn = test_conn();
        let id = open_or_create_single(&conn, "alice").unwrap();
        append_turn(&conn, &id, &turn("one", "")).unwrap();
        append_turn(&conn, &id, &turn("two", "svar")).unwrap();
        end_single(&conn, "alice").unwrap();

        let convos = get_user_conversations(&conn, "alice").unwrap();
        assert_eq!(convos.len(), 1);
        assert!(convos[0].ended);
        assert!(convos[0].ended_at.is_some());
        assert_eq!(convos[0].turns.len(), 2);
    }

    #[test]
    fn blank_prompt_turn_is_discarded() {
        let conn = test_conn();
        let id = open_or_create_single(&conn, "alice").unwrap();
        append_turn(&conn, &id, &turn("  ", "")).unwrap();
        append_turn(&conn, &id, &turn("", "answer without prompt")).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM turns", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "blank prompts must never be persisted");
    }

    #[test]
    fn turns_round_trip_in_insertion_order() {
        let conn = test_conn();
        let id = open_or_create_single(&conn, "alice").unwrap();
        for prompt in ["first", "second", "third"] {
            append_turn(&conn, &id, &turn(prompt, "")).unwrap();
        }

        let convos = get_user_conversations(&conn, "alice").unwrap();
        let prompts: Vec<&str> = convos[0]
            .turns
            .iter()
            .map(|t| t.prompt_text.as_str())
            .collect();
        assert_eq!(prompts, vec!["first", "second", "third"]);
    }

    #[test]
    fn multi_user_matches_exact_set_order_independent() {
        let conn = test_conn();
        let ab = open_or_create_multi(&conn, &["a".into(), "b".into()]).unwrap();
        let ba = open_or_create_multi(&conn, &["b".into(), "a".into()]).unwrap();
        assert_eq!(ab, ba, "participant order must not matter");

        let abc = open_or_create_multi(&conn, &["a".into(), "b".into(), "c".into()]).unwrap();
        assert_ne!(ab, abc, "different sets get different conversations");
    }

    #[test]
    fn multi_user_set_match_requires_exact_membership() {
        let conn = test_conn();
        open_or_create_multi(&conn, &["a".into(), "b".into(), "c".into()]).unwrap();
        let smaller = find_open_multi(&conn, &["a".into(), "b".into()]).unwrap();
        assert!(smaller.is_none(), "subset must not match a larger set");
    }

    #[test]
    fn ended_multi_conversation_is_not_reused() {
        let conn = test_conn();
        let participants = vec!["a".to_string(), "b".to_string()];
        let first = open_or_create_multi(&conn, &participants).unwrap();
        end_multi(&conn, &participants).unwrap();
        let second = open_or_create_multi(&conn, &participants).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_participant_list_is_rejected() {
        let conn = test_conn();
        let err = open_or_create_multi(&conn, &[]).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn user_conversations_include_multi_membership() {
        let conn = test_conn();
        let single = open_or_create_single(&conn, "a").unwrap();
        append_turn(&conn, &single, &turn("solo", "")).unwrap();
        let multi = open_or_create_multi(&conn, &["a".into(), "b".into()]).unwrap();
        append_turn(&conn, &multi, &turn("tillsammans", "")).unwrap();

        let convos = get_user_conversations(&conn, "a").unwrap();
        assert_eq!(convos.len(), 2);
        let multi_row = convos.iter().find(|c| c.id == multi).unwrap();
        assert_eq!(multi_row.participants, vec!["a", "b"]);
    }

    #[test]
    fn no_conversations_is_not_found() {
        let conn = test_conn();
        assert!(matches!(
            get_user_conversations(&conn, "nobody"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            get_all_conversations(&conn),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn date_range_is_inclusive_and_spans_namespaces() {
        let conn = test_conn();
        let single = open_or_create_single(&conn, "a").unwrap();
        append_turn(&conn, &single, &turn("x", "")).unwrap();
        let multi = open_or_create_multi(&conn, &["a".into(), "b".into()]).unwrap();
        append_turn(&conn, &multi, &turn("y", "")).unwrap();

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let found = get_conversations_by_date_range(&conn, None, &today, &today).unwrap();
        assert_eq!(found.len(), 2);

        let err =
            get_conversations_by_date_range(&conn, None, "2000-01-01", "2000-01-02").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn date_range_rejects_garbage_bounds() {
        let conn = test_conn();
        let err = get_conversations_by_date_range(&conn, None, "whenever", "2026-01-01").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn audio_reference_selection_modes() {
        let conn = test_conn();
        let c1 = open_or_create_single(&conn, "a").unwrap();
        append_turn(&conn, &c1, &turn("p1", "a1")).unwrap();
        end_single(&conn, "a").unwrap();
        let c2 = open_or_create_single(&conn, "b").unwrap();
        append_turn(&conn, &c2, &turn("p2", "")).unwrap();

        assert_eq!(get_audio_references(&conn, None, None).unwrap().len(), 2);
        assert_eq!(
            get_audio_references(&conn, Some("a"), None).unwrap().len(),
            1
        );
        assert_eq!(
            get_audio_references(&conn, Some("a"), Some(&c1)).unwrap().len(),
            1
        );
        assert_eq!(
            get_audio_references(&conn, None, Some(&c2)).unwrap().len(),
            1
        );
        // Wrong user for the conversation: nothing.
        assert!(get_audio_references(&conn, Some("b"), Some(&c1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn guest_counter_allocates_monotonically() {
        let conn = test_conn();
        assert_eq!(next_guest_id(&conn).unwrap(), "Guest-1");
        assert_eq!(next_guest_id(&conn).unwrap(), "Guest-2");
    }

    #[test]
    fn guest_counter_seeds_past_existing_guests() {
        let conn = test_conn();
        open_or_create_single(&conn, "Guest-41").unwrap();
        assert_eq!(next_guest_id(&conn).unwrap(), "Guest-42");
    }

    #[test]
    fn range_bound_parsing() {
        let start = parse_range_bound("2026-08-01", false).unwrap();
        assert_eq!(start.to_string(), "2026-08-01 00:00:00");
        let end = parse_range_bound("2026-08-01", true).unwrap();
        assert_eq!(end.to_string(), "2026-08-01 23:59:59");
        let exact = parse_range_bound("2026-08-01 12:30:00", true).unwrap();
        assert_eq!(exact.to_string(), "2026-08-01 12:30:00");
        assert!(parse_range_bound("soon", false).is_err());
    }
}
