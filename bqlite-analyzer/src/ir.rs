//! The resolved-tree intermediate representation: sum-typed `ScanData`,
//! `ExpressionData`, and `StatementData` records, each carrying an output
//! column list whose identifiers were allocated in walk order.

use bqlite_value::Type;

/// A monotonically increasing identifier, unique within one analysis pass.
/// Every transformer answers column references by this id through the
/// fragment context rather than by name, since two columns can share a name
/// across a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub u64);

#[derive(Default)]
pub struct ColumnIdAllocator {
    next: u64,
}

impl ColumnIdAllocator {
    pub fn alloc(&mut self) -> ColumnId {
        let id = ColumnId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub id: ColumnId,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpQuantifier {
    All,
    Distinct,
}

#[derive(Debug, Clone)]
pub struct AggregateCall {
    pub output: OutputColumn,
    pub function: String,
    pub arguments: Vec<ExpressionData>,
}

#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expr: ExpressionData,
    pub descending: bool,
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct WithEntry {
    pub name: String,
    pub body: Box<ScanData>,
    pub columns: Vec<OutputColumn>,
}

#[derive(Debug, Clone)]
pub struct WindowSpec {
    pub partition_by: Vec<ExpressionData>,
    pub order_by: Vec<OrderByItem>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnit {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameBoundary {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

#[derive(Debug, Clone, Copy)]
pub struct WindowFrame {
    pub unit: FrameUnit,
    pub start: FrameBoundary,
    pub end: FrameBoundary,
}

#[derive(Debug, Clone)]
pub enum ScanData {
    Table {
        output: Vec<OutputColumn>,
        path: Vec<String>,
    },
    Join {
        join_type: JoinType,
        left: Box<ScanData>,
        right: Box<ScanData>,
        condition: Option<Box<ExpressionData>>,
        output: Vec<OutputColumn>,
    },
    Filter {
        input: Box<ScanData>,
        condition: Box<ExpressionData>,
    },
    Project {
        input: Box<ScanData>,
        output: Vec<OutputColumn>,
        expressions: Vec<(ColumnId, ExpressionData)>,
    },
    Aggregate {
        input: Box<ScanData>,
        group_by: Vec<ExpressionData>,
        grouping_sets: Vec<Vec<usize>>,
        aggregates: Vec<AggregateCall>,
        output: Vec<OutputColumn>,
        needs_row_id: bool,
    },
    OrderBy {
        input: Box<ScanData>,
        items: Vec<OrderByItem>,
    },
    Limit {
        input: Box<ScanData>,
        limit: u64,
        offset: Option<u64>,
    },
    SingleRow,
    With {
        entries: Vec<WithEntry>,
        body: Box<ScanData>,
    },
    WithRef {
        name: String,
        output: Vec<OutputColumn>,
    },
    SetOp {
        kind: SetOpKind,
        quantifier: SetOpQuantifier,
        inputs: Vec<ScanData>,
        output: Vec<OutputColumn>,
    },
    Array {
        input: Option<Box<ScanData>>,
        expr: Box<ExpressionData>,
        element: OutputColumn,
    },
    Analytic {
        input: Box<ScanData>,
        functions: Vec<AggregateCall>,
        windows: Vec<WindowSpec>,
        output: Vec<OutputColumn>,
    },
}

#[derive(Debug, Clone)]
pub enum SubqueryKind {
    Scalar,
    Array,
    Exists,
    In,
    LikeAny,
    LikeAll,
}

#[derive(Debug, Clone)]
pub enum ExpressionData {
    Literal(bqlite_value::Value),
    Column { id: ColumnId, name: String },
    Function { name: String, arguments: Vec<ExpressionData>, window: Option<WindowSpec> },
    Cast { input: Box<ExpressionData>, to: Type, safe: bool },
    Subquery { kind: SubqueryKind, body: Box<ScanData> },
    Parameter { name: Option<String> },
    MakeStruct { fields: Vec<(String, ExpressionData)> },
    GetStructField { input: Box<ExpressionData>, index: usize },
    Case { branches: Vec<(ExpressionData, ExpressionData)>, else_: Option<Box<ExpressionData>> },
    Binary { op: String, left: Box<ExpressionData>, right: Box<ExpressionData> },
    Unary { op: String, operand: Box<ExpressionData> },
    List(Vec<ExpressionData>),
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMatchKind {
    Matched,
    NotMatched,
    NotMatchedBySource,
}

#[derive(Debug, Clone)]
pub enum MergeActionKind {
    UpdateSet(Vec<(String, ExpressionData)>),
    Delete,
    InsertValues { columns: Vec<String>, values: Vec<ExpressionData> },
    InsertRow,
    DoNothing,
}

#[derive(Debug, Clone)]
pub struct MergeClauseData {
    pub kind: MergeMatchKind,
    pub predicate: Option<ExpressionData>,
    pub action: MergeActionKind,
}

#[derive(Debug, Clone)]
pub enum StatementData {
    Select { body: ScanData },
    Insert { table: Vec<String>, columns: Vec<String>, source: ScanData },
    Update { table: Vec<String>, from: Option<ScanData>, assignments: Vec<(String, ExpressionData)>, filter: Option<ExpressionData> },
    Delete { table: Vec<String>, filter: Option<ExpressionData> },
    Merge { target: Vec<String>, source: ScanData, condition: ExpressionData, clauses: Vec<MergeClauseData> },
    Drop { path: Vec<String>, kind: String },
    CreateTable { path: Vec<String>, columns: Vec<String>, as_select: Option<ScanData> },
    CreateView { path: Vec<String>, body: ScanData },
    CreateFunction { path: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_ids_are_unique_and_monotonic() {
        let mut alloc = ColumnIdAllocator::default();
        let ids: Vec<_> = (0..5).map(|_| alloc.alloc()).collect();
        for w in ids.windows(2) {
            assert!(w[1].0 > w[0].0);
        }
    }
}
