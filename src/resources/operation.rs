//! The five CRUD-shaped operations and sets of them.

use std::fmt;

/// A generic REST verb mapped onto one backend method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    GetById,
    Update,
    Delete,
    List,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::GetById,
        Operation::Update,
        Operation::Delete,
        Operation::List,
    ];

    /// Backend method name.
    pub fn rpc_method(self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::GetById => "GetById",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::List => "GetAll",
        }
    }

    /// Past tense used in success messages ("Student created successfully").
    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::GetById => "fetched",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
            Operation::List => "listed",
        }
    }

    /// Progressive form used in failure descriptions ("error while creating student").
    pub fn progressive(self) -> &'static str {
        match self {
            Operation::Create => "creating",
            Operation::GetById => "getting",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
            Operation::List => "listing",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Operation::Create => 1,
            Operation::GetById => 1 << 1,
            Operation::Update => 1 << 2,
            Operation::Delete => 1 << 3,
            Operation::List => 1 << 4,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::GetById => "get_by_id",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        };
        f.write_str(name)
    }
}

/// The subset of operations a resource supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSet(u8);

impl OperationSet {
    pub const ALL: OperationSet = OperationSet::of(&Operation::ALL);

    /// Build a set at compile time.
    pub const fn of(ops: &[Operation]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < ops.len() {
            bits |= ops[i].bit();
            i += 1;
        }
        OperationSet(bits)
    }

    pub fn contains(self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Operation> {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}
