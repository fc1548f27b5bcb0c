//! The fixed table of resource descriptors.

use crate::resources::descriptor::{ResourceDescriptor, ResourceKind};
use crate::resources::operation::{Operation, OperationSet};

pub const USER_SERVICE: &str = "user_service";
pub const SCHEDULE_SERVICE: &str = "schedule_service";

const NO_UPDATE_OR_LIST: OperationSet =
    OperationSet::of(&[Operation::Create, Operation::GetById, Operation::Delete]);
const NO_DELETE: OperationSet = OperationSet::of(&[
    Operation::Create,
    Operation::GetById,
    Operation::Update,
    Operation::List,
]);

static DESCRIPTORS: [ResourceDescriptor; 14] = [
    ResourceDescriptor {
        kind: ResourceKind::SuperAdmin,
        path: "super-admin",
        collection: Some("super-admins"),
        display: "Super admin",
        display_plural: "Super admins",
        backend_group: USER_SERVICE,
        service: "user_service.SuperAdminService",
        operations: OperationSet::ALL,
        identity_checks: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::Branch,
        path: "branch",
        collection: Some("branches"),
        display: "Branch",
        display_plural: "Branches",
        backend_group: USER_SERVICE,
        service: "user_service.BranchesService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Administrator,
        path: "admin",
        collection: Some("admins"),
        display: "Administrator",
        display_plural: "Administrators",
        backend_group: USER_SERVICE,
        service: "user_service.AdministratorsService",
        operations: OperationSet::ALL,
        identity_checks: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::Event,
        path: "event",
        collection: Some("events"),
        display: "Event",
        display_plural: "Events",
        backend_group: USER_SERVICE,
        service: "user_service.EventService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Group,
        path: "group",
        collection: Some("groups"),
        display: "Group",
        display_plural: "Groups",
        backend_group: USER_SERVICE,
        service: "user_service.GroupsService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::JoinEvent,
        path: "join-event",
        collection: None,
        display: "Join event",
        display_plural: "Join events",
        backend_group: USER_SERVICE,
        service: "user_service.JoinEventService",
        operations: NO_UPDATE_OR_LIST,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Manager,
        path: "manager",
        collection: Some("managers"),
        display: "Manager",
        display_plural: "Managers",
        backend_group: USER_SERVICE,
        service: "user_service.ManagersService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Student,
        path: "student",
        collection: Some("students"),
        display: "Student",
        display_plural: "Students",
        backend_group: USER_SERVICE,
        service: "user_service.StudentService",
        operations: OperationSet::ALL,
        identity_checks: true,
    },
    ResourceDescriptor {
        kind: ResourceKind::SupportTeacher,
        path: "support-teacher",
        collection: Some("support-teachers"),
        display: "Support teacher",
        display_plural: "Support teachers",
        backend_group: USER_SERVICE,
        service: "user_service.SupportTeacherService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Teacher,
        path: "teacher",
        collection: Some("teachers"),
        display: "Teacher",
        display_plural: "Teachers",
        backend_group: USER_SERVICE,
        service: "user_service.TeacherService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Schedule,
        path: "schedule",
        collection: Some("schedules"),
        display: "Schedule",
        display_plural: "Schedules",
        backend_group: SCHEDULE_SERVICE,
        service: "schedule_service.ScheduleService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Task,
        path: "task",
        collection: Some("tasks"),
        display: "Task",
        display_plural: "Tasks",
        backend_group: SCHEDULE_SERVICE,
        service: "schedule_service.TaskService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Lesson,
        path: "lesson",
        collection: Some("lessons"),
        display: "Lesson",
        display_plural: "Lessons",
        backend_group: SCHEDULE_SERVICE,
        // Spelling matches the service name registered by the schedule backend.
        service: "schedule_service.LesssonService",
        operations: NO_DELETE,
        identity_checks: false,
    },
    ResourceDescriptor {
        kind: ResourceKind::Attendance,
        path: "attendance",
        collection: Some("attendances"),
        display: "Attendance",
        display_plural: "Attendances",
        backend_group: SCHEDULE_SERVICE,
        service: "schedule_service.AttendanceService",
        operations: OperationSet::ALL,
        identity_checks: false,
    },
];

/// All descriptors in route registration order.
pub fn all() -> &'static [ResourceDescriptor] {
    &DESCRIPTORS
}

/// Descriptor for a kind.
pub fn get(kind: ResourceKind) -> &'static ResourceDescriptor {
    &DESCRIPTORS[index(kind)]
}

/// Position of a kind in `DESCRIPTORS`. Exhaustive, so a new kind must be placed here.
const fn index(kind: ResourceKind) -> usize {
    match kind {
        ResourceKind::SuperAdmin => 0,
        ResourceKind::Branch => 1,
        ResourceKind::Administrator => 2,
        ResourceKind::Event => 3,
        ResourceKind::Group => 4,
        ResourceKind::JoinEvent => 5,
        ResourceKind::Manager => 6,
        ResourceKind::Student => 7,
        ResourceKind::SupportTeacher => 8,
        ResourceKind::Teacher => 9,
        ResourceKind::Schedule => 10,
        ResourceKind::Task => 11,
        ResourceKind::Lesson => 12,
        ResourceKind::Attendance => 13,
    }
}

/// Descriptor by singular path segment.
pub fn find_by_path(path: &str) -> Option<&'static ResourceDescriptor> {
    DESCRIPTORS.iter().find(|d| d.path == path)
}

/// Distinct backend groups referenced by the catalogue.
pub fn backend_groups() -> Vec<&'static str> {
    let mut groups: Vec<&'static str> = DESCRIPTORS.iter().map(|d| d.backend_group).collect();
    groups.sort_unstable();
    groups.dedup();
    groups
}
