//! Constants for the cache key space and the destination table.

/// Literal prefix carried by every cache key holding a task record.
/// The suffix after the prefix is the opaque task identifier.
pub const KEY_PREFIX: &str = "mj-task-store::";

/// SCAN match pattern covering the task key space ([`KEY_PREFIX`] plus a
/// wildcard suffix).
pub const SCAN_MATCH: &str = "mj-task-store::*";

/// Page-size hint passed as the SCAN `COUNT` argument. The store may return
/// more or fewer keys per page.
pub const SCAN_COUNT: usize = 300;

/// SCAN cursor origin. A scan starts here, and a returned cursor equal to
/// this value signals that the iteration has come full circle.
pub const SCAN_CURSOR_START: u64 = 0;

/// Destination table name.
pub const TABLE_NAME: &str = "mj_task";

/// Destination columns in insert order. Must match the field order of
/// [`TaskRow`](crate::record::TaskRow).
pub const COLUMNS: &str = "id, properties, action, status, prompt, prompt_en, \
     description, submit_time, start_time, finish_time, progress, image_url, \
     fail_reason, state, buttons";

/// DDL for the destination table. The table must exist before the first
/// run; the tool itself never executes DDL.
pub const MJ_TASK_SCHEMA: &str = r"CREATE TABLE IF NOT EXISTS mj_task (
    id varchar(32) NOT NULL PRIMARY KEY,
    properties json NULL,
    action varchar(20) NULL,
    status varchar(20) NULL,
    prompt varchar(3000) NULL,
    prompt_en varchar(3000) NULL,
    description text NULL,
    submit_time bigint NULL,
    start_time bigint NULL,
    finish_time bigint NULL,
    progress varchar(50) NULL,
    image_url varchar(3000) NULL,
    fail_reason varchar(1000) NULL,
    state varchar(500) NULL,
    buttons json NULL
)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_pattern_extends_key_prefix() {
        assert_eq!(SCAN_MATCH, format!("{KEY_PREFIX}*"));
    }

    #[test]
    fn column_list_matches_schema() {
        let columns: Vec<&str> = COLUMNS.split(',').map(str::trim).collect();
        assert_eq!(columns.len(), 15);
        for column in columns {
            assert!(
                MJ_TASK_SCHEMA.contains(column),
                "schema is missing column {column}"
            );
        }
    }
}
