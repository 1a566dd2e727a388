//! Byte-offset reconstruction for dotted column references.
//!
//! `pg_query` gives us a single [`location`] for a `ColumnRef` (the start of
//! its first field) and the decoded text of each dotted field, but not the
//! offset of each individual field. We recover those by scanning forward
//! from `location`, since the source text between fields is just `.` or a
//! pair of quotes plus the field's own bytes.

use crate::model::{Ident, ReferencePart};

/// Reconstruct one [`ReferencePart`] per field, starting at `location`.
///
/// `fields` are the field texts in source order (already unescaped by
/// `pg_query`, e.g. `managerId` rather than `"managerId"`). `quoted[i]`
/// tells us whether `fields[i]` was a quoted identifier in the source; we
/// get this by probing the source byte at the running cursor for `"`
/// before consuming the field.
///
/// Doesn't handle identifiers containing an escaped `""` (the segment
/// length would then undercount); negligible in practice for this corpus.
pub fn compute_reference_parts(source: &str, location: usize, fields: &[String]) -> Vec<ReferencePart> {
    let bytes = source.as_bytes();
    let mut cursor = location;
    let mut parts = Vec::with_capacity(fields.len());

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            // Skip the separating '.', and any whitespace pg_query tolerates
            // around it in the original text.
            while bytes.get(cursor).is_some_and(|b| b.is_ascii_whitespace()) {
                cursor += 1;
            }
            if bytes.get(cursor) == Some(&b'.') {
                cursor += 1;
            }
            while bytes.get(cursor).is_some_and(|b| b.is_ascii_whitespace()) {
                cursor += 1;
            }
        }

        let quoted = bytes.get(cursor) == Some(&b'"');
        let start = cursor;
        if quoted {
            cursor += 1;
        }
        cursor += field.len();
        if quoted {
            cursor += 1;
        }

        parts.push(ReferencePart {
            ident: if quoted { Ident::quoted(field.clone()) } else { Ident::unquoted(field.clone()) },
            offset: start,
        });
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_single_part_at_location() {
        let sql = "select name from employees";
        let parts = compute_reference_parts(sql, 7, &["name".to_string()]);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].offset, 7);
        assert!(!parts[0].ident.quoted);
    }

    #[test]
    fn dotted_parts_advance_past_the_dot() {
        let sql = "select e.id from employees e";
        let parts = compute_reference_parts(sql, 7, &["e".to_string(), "id".to_string()]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].offset, 7);
        assert_eq!(parts[1].offset, 9);
    }

    #[test]
    fn quoted_part_offset_includes_opening_quote() {
        let sql = "select e.\"managerId\" from employees e";
        let parts = compute_reference_parts(sql, 7, &["e".to_string(), "managerId".to_string()]);
        assert_eq!(parts[1].offset, 9);
        assert!(parts[1].ident.quoted);
    }
}
