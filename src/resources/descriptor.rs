//! Static metadata describing one resource kind.

use std::fmt;

use crate::resources::operation::{Operation, OperationSet};

/// Every resource family the gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    SuperAdmin,
    Branch,
    Administrator,
    Event,
    Group,
    JoinEvent,
    Manager,
    Student,
    SupportTeacher,
    Teacher,
    Schedule,
    Task,
    Lesson,
    Attendance,
}

impl ResourceKind {
    /// The descriptor registered for this kind.
    pub fn descriptor(self) -> &'static ResourceDescriptor {
        crate::resources::catalog::get(self)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().path)
    }
}

/// Immutable description of a resource kind, defined at startup.
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    /// Singular path segment (`/api/v1/{path}`).
    pub path: &'static str,
    /// Collection path segment for listing, when listing is supported.
    pub collection: Option<&'static str>,
    /// Human-readable singular name ("Student").
    pub display: &'static str,
    /// Human-readable plural name ("Students").
    pub display_plural: &'static str,
    /// Backend group whose connection serves this resource.
    pub backend_group: &'static str,
    /// Fully qualified RPC service name ("user_service.StudentService").
    pub service: &'static str,
    pub operations: OperationSet,
    /// Run the name/secret/phone pipeline on create and update payloads.
    pub identity_checks: bool,
}

impl ResourceDescriptor {
    pub fn supports(&self, op: Operation) -> bool {
        self.operations.contains(op)
    }

    /// gRPC method path for an operation, e.g. `/user_service.StudentService/GetById`.
    pub fn method_path(&self, op: Operation) -> String {
        format!("/{}/{}", self.service, op.rpc_method())
    }

    /// Whether the validation pipeline applies to this operation.
    pub fn validates(&self, op: Operation) -> bool {
        self.identity_checks && matches!(op, Operation::Create | Operation::Update)
    }

    /// Message attached to a successful response.
    pub fn success_message(&self, op: Operation) -> String {
        let subject = match op {
            Operation::List => self.display_plural,
            _ => self.display,
        };
        format!("{} {} successfully", subject, op.past_tense())
    }

    /// Description attached to a failed response.
    pub fn failure_description(&self, op: Operation) -> String {
        let subject = match op {
            Operation::List => self.display_plural,
            _ => self.display,
        };
        format!("error while {} {}", op.progressive(), subject.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let student = ResourceKind::Student.descriptor();
        assert_eq!(student.success_message(Operation::Create), "Student created successfully");
        assert_eq!(student.success_message(Operation::List), "Students listed successfully");
        assert_eq!(
            student.failure_description(Operation::GetById),
            "error while getting student"
        );
        assert_eq!(
            ResourceKind::SupportTeacher.descriptor().failure_description(Operation::List),
            "error while listing support teachers"
        );
    }

    #[test]
    fn test_method_path() {
        let lesson = ResourceKind::Lesson.descriptor();
        assert_eq!(lesson.method_path(Operation::List), "/schedule_service.LesssonService/GetAll");
    }

    #[test]
    fn test_validates_only_writes() {
        let admin = ResourceKind::Administrator.descriptor();
        assert!(admin.validates(Operation::Create));
        assert!(admin.validates(Operation::Update));
        assert!(!admin.validates(Operation::Delete));
        assert!(!ResourceKind::Branch.descriptor().validates(Operation::Create));
    }
}
