//! Recursive descent over a `pg_query` AST, collecting column references,
//! referenced relations, and CTE names.
//!
//! Column-reference coverage mirrors the node set a `pg_query`-based linter
//! needs for expression trees: `ColumnRef`, `FuncCall`, `TypeCast`, `AExpr`,
//! `BoolExpr`, `CaseExpr`, `CaseWhen`, `CoalesceExpr`, `NullTest`,
//! `MinMaxExpr`. Two positions are marked `ignored` at the point of
//! recording rather than by a later pass: a bare `ColumnRef` that is
//! directly a `SELECT` target's value, and any `ColumnRef` reached while
//! inside a `FuncCall`'s argument list (at any nesting depth).

use pg_query::NodeEnum;
use pg_query::protobuf::{
    CommonTableExpr, DeleteStmt, InsertStmt, Node as PgNode, RangeVar, SelectStmt, UpdateStmt,
    WithClause,
};
use std::collections::HashSet;

use crate::model::DEFAULT_SCHEMA;

#[derive(Debug)]
pub struct RawReference {
    pub fields: Vec<String>,
    pub location: usize,
    pub ignored: bool,
}

#[derive(Debug)]
pub struct RawTable {
    pub schema: String,
    pub table: String,
    pub alias: Option<String>,
}

#[derive(Debug, Default)]
pub struct WalkResult {
    pub references: Vec<RawReference>,
    pub tables: Vec<RawTable>,
    pub cte_names: HashSet<String>,
}

#[derive(Default)]
struct Walker {
    result: WalkResult,
}

/// Walk whichever statement kind this top-level node is; everything else
/// (DDL, utility statements) yields an empty result.
pub fn walk_top_level(node: &NodeEnum) -> WalkResult {
    let mut w = Walker::default();
    match node {
        NodeEnum::SelectStmt(s) => w.walk_select(s),
        NodeEnum::UpdateStmt(s) => w.walk_update(s),
        NodeEnum::DeleteStmt(s) => w.walk_delete(s),
        NodeEnum::InsertStmt(s) => w.walk_insert(s),
        _ => {}
    }
    w.result
}

impl Walker {
    fn walk_select(&mut self, s: &SelectStmt) {
        if let Some(with) = &s.with_clause {
            self.walk_with_clause(with);
        }
        for item in &s.from_clause {
            self.walk_from_item(item);
        }
        self.walk_target_list(&s.target_list);
        if let Some(expr) = &s.where_clause {
            self.walk_expr(expr, false);
        }
        for expr in &s.group_clause {
            self.walk_expr(expr, false);
        }
        if let Some(expr) = &s.having_clause {
            self.walk_expr(expr, false);
        }
        for sort in &s.sort_clause {
            self.walk_sort_by(sort);
        }
        if let Some(larg) = &s.larg {
            self.walk_select(larg);
        }
        if let Some(rarg) = &s.rarg {
            self.walk_select(rarg);
        }
    }

    fn walk_update(&mut self, s: &UpdateStmt) {
        if let Some(with) = &s.with_clause {
            self.walk_with_clause(with);
        }
        if let Some(rel) = &s.relation {
            self.record_range_var(rel);
        }
        for item in &s.from_clause {
            self.walk_from_item(item);
        }
        for item in &s.target_list {
            if let Some(NodeEnum::ResTarget(rt)) = item.node.as_ref()
                && let Some(val) = &rt.val
            {
                self.walk_expr(val, false);
            }
        }
        if let Some(expr) = &s.where_clause {
            self.walk_expr(expr, false);
        }
    }

    fn walk_delete(&mut self, s: &DeleteStmt) {
        if let Some(with) = &s.with_clause {
            self.walk_with_clause(with);
        }
        if let Some(rel) = &s.relation {
            self.record_range_var(rel);
        }
        for item in &s.using_clause {
            self.walk_from_item(item);
        }
        if let Some(expr) = &s.where_clause {
            self.walk_expr(expr, false);
        }
    }

    fn walk_insert(&mut self, s: &InsertStmt) {
        if let Some(with) = &s.with_clause {
            self.walk_with_clause(with);
        }
        if let Some(rel) = &s.relation {
            self.record_range_var(rel);
        }
        if let Some(select) = &s.select_stmt {
            self.walk_nested_query(select);
        }
    }

    fn walk_with_clause(&mut self, wc: &WithClause) {
        for node in &wc.ctes {
            if let Some(NodeEnum::CommonTableExpr(cte)) = node.node.as_ref() {
                self.walk_cte(cte);
            }
        }
    }

    fn walk_cte(&mut self, cte: &CommonTableExpr) {
        self.result.cte_names.insert(cte.ctename.clone());
        if let Some(query) = &cte.ctequery {
            self.walk_nested_query(query);
        }
    }

    fn walk_nested_query(&mut self, node: &PgNode) {
        if let Some(NodeEnum::SelectStmt(s)) = node.node.as_ref() {
            self.walk_select(s);
        }
    }

    fn walk_from_item(&mut self, node: &PgNode) {
        let Some(inner) = node.node.as_ref() else { return };
        match inner {
            NodeEnum::RangeVar(rv) => self.record_range_var(rv),
            NodeEnum::JoinExpr(je) => {
                if let Some(larg) = &je.larg {
                    self.walk_from_item(larg);
                }
                if let Some(rarg) = &je.rarg {
                    self.walk_from_item(rarg);
                }
                if let Some(quals) = &je.quals {
                    self.walk_expr(quals, false);
                }
            }
            NodeEnum::RangeSubselect(rs) => {
                if let Some(subquery) = &rs.subquery {
                    self.walk_nested_query(subquery);
                }
            }
            _ => {}
        }
    }

    fn record_range_var(&mut self, rv: &RangeVar) {
        let schema = if rv.schemaname.is_empty() {
            DEFAULT_SCHEMA.to_string()
        } else {
            rv.schemaname.clone()
        };
        let alias = rv
            .alias
            .as_ref()
            .map(|a| a.aliasname.clone())
            .filter(|a| !a.is_empty());
        self.result.tables.push(RawTable { schema, table: rv.relname.clone(), alias });
    }

    fn walk_target_list(&mut self, list: &[PgNode]) {
        for item in list {
            let Some(NodeEnum::ResTarget(rt)) = item.node.as_ref() else { continue };
            let Some(val) = &rt.val else { continue };
            match val.node.as_ref() {
                Some(NodeEnum::ColumnRef(cr)) => self.record_column_ref(cr, true),
                _ => self.walk_expr(val, false),
            }
        }
    }

    fn walk_sort_by(&mut self, node: &PgNode) {
        if let Some(NodeEnum::SortBy(sb)) = node.node.as_ref()
            && let Some(inner) = &sb.node
        {
            self.walk_expr(inner, false);
        }
    }

    /// `in_func_args` is sticky: once true, every `ColumnRef` reached below
    /// this point is recorded `ignored` regardless of further nesting.
    fn walk_expr(&mut self, node: &PgNode, in_func_args: bool) {
        let Some(inner) = node.node.as_ref() else { return };
        match inner {
            NodeEnum::ColumnRef(cr) => self.record_column_ref(cr, in_func_args),
            NodeEnum::FuncCall(fc) => {
                for arg in &fc.args {
                    self.walk_expr(arg, true);
                }
                if let Some(filter) = &fc.agg_filter {
                    self.walk_expr(filter, true);
                }
            }
            NodeEnum::TypeCast(tc) => {
                if let Some(arg) = &tc.arg {
                    self.walk_expr(arg, in_func_args);
                }
            }
            NodeEnum::AExpr(expr) => {
                if let Some(l) = &expr.lexpr {
                    self.walk_expr(l, in_func_args);
                }
                if let Some(r) = &expr.rexpr {
                    self.walk_expr(r, in_func_args);
                }
            }
            NodeEnum::BoolExpr(be) => {
                for arg in &be.args {
                    self.walk_expr(arg, in_func_args);
                }
            }
            NodeEnum::CaseExpr(ce) => {
                if let Some(arg) = &ce.arg {
                    self.walk_expr(arg, in_func_args);
                }
                for when in &ce.args {
                    self.walk_expr(when, in_func_args);
                }
                if let Some(def) = &ce.defresult {
                    self.walk_expr(def, in_func_args);
                }
            }
            NodeEnum::CaseWhen(cw) => {
                if let Some(expr) = &cw.expr {
                    self.walk_expr(expr, in_func_args);
                }
                if let Some(result) = &cw.result {
                    self.walk_expr(result, in_func_args);
                }
            }
            NodeEnum::CoalesceExpr(ce) => {
                for arg in &ce.args {
                    self.walk_expr(arg, in_func_args);
                }
            }
            NodeEnum::NullTest(nt) => {
                if let Some(arg) = &nt.arg {
                    self.walk_expr(arg, in_func_args);
                }
            }
            NodeEnum::MinMaxExpr(mm) => {
                for arg in &mm.args {
                    self.walk_expr(arg, in_func_args);
                }
            }
            _ => {}
        }
    }

    /// Records one occurrence. `*` and `tbl.*` carry a non-`String` final
    /// field and aren't real column references; skipped.
    fn record_column_ref(&mut self, cr: &pg_query::protobuf::ColumnRef, ignored: bool) {
        let mut fields = Vec::with_capacity(cr.fields.len());
        for field in &cr.fields {
            match field.node.as_ref() {
                Some(NodeEnum::String(s)) => fields.push(s.sval.clone()),
                _ => return,
            }
        }
        if fields.is_empty() {
            return;
        }
        self.result.references.push(RawReference {
            fields,
            location: cr.location.max(0) as usize,
            ignored,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(sql: &str) -> WalkResult {
        let parsed = pg_query::parse(sql).expect("valid sql");
        let stmt = parsed.protobuf.stmts[0]
            .stmt
            .as_ref()
            .and_then(|s| s.node.as_ref())
            .expect("statement body");
        walk_top_level(stmt)
    }

    #[test]
    fn collects_tables_and_aliases() {
        let r = walk("select e.name from employees e join departments d on e.dept_id = d.id");
        assert_eq!(r.tables.len(), 2);
        assert_eq!(r.tables[0].table, "employees");
        assert_eq!(r.tables[0].alias.as_deref(), Some("e"));
        assert_eq!(r.tables[1].table, "departments");
    }

    #[test]
    fn projection_column_ref_is_ignored() {
        let r = walk("select name from employees order by name limit 10");
        let projection = r.references.iter().find(|rf| rf.fields == vec!["name".to_string()] && rf.location < 20);
        // first occurrence ("select name") is the bare projection target
        let first = r.references.iter().min_by_key(|rf| rf.location).unwrap();
        assert!(first.ignored);
        assert!(projection.is_some());
    }

    #[test]
    fn where_clause_reference_is_a_candidate() {
        let r = walk("select 1 from employees where manager_id = 5");
        let where_ref = r.references.iter().find(|rf| rf.fields == vec!["manager_id".to_string()]).unwrap();
        assert!(!where_ref.ignored);
    }

    #[test]
    fn function_argument_is_ignored_regardless_of_clause() {
        let r = walk("select * from employees where lower(name) = 'x'");
        let arg_ref = r.references.iter().find(|rf| rf.fields == vec!["name".to_string()]).unwrap();
        assert!(arg_ref.ignored);
    }

    #[test]
    fn join_qualifier_reference_is_a_candidate() {
        let r = walk("select 1 from employees e join departments d on e.dept_id = d.id");
        let join_ref = r
            .references
            .iter()
            .find(|rf| rf.fields == vec!["e".to_string(), "dept_id".to_string()])
            .unwrap();
        assert!(!join_ref.ignored);
    }

    #[test]
    fn cte_name_is_recorded() {
        let r = walk("with recent as (select id from employees) select id from recent");
        assert!(r.cte_names.contains("recent"));
    }

    #[test]
    fn star_projection_is_skipped() {
        let r = walk("select * from employees");
        assert!(r.references.is_empty());
    }
}
