//! Property-based tests for the JSON wire types.
//!
//! Uses proptest to verify:
//! 1. Any listing of tasks with assignments survives a JSON round-trip.
//! 2. Any create request survives a JSON round-trip, whatever its assignment mode.
//! 3. Arbitrary text never panics the listing decoder.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use taskboard_proto::api::{AssignmentMode, CreateTaskRequest, TaskDraft};
use taskboard_proto::assignment::{Assignment, AssignmentStatus};
use taskboard_proto::ids::{AssignmentId, CompanyId, TaskId, TaskTypeId, UserId};
use taskboard_proto::task::{Priority, Task, TaskWithAssignments};

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn arb_status() -> impl Strategy<Value = AssignmentStatus> {
    prop::sample::select(AssignmentStatus::ALL.to_vec())
}

/// Days between 2000-01-01 and roughly 2050.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..18_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default() + chrono::Duration::days(offset)
    })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        any::<u64>(),
        "[^\x00]{1,64}",
        ".{0,128}",
        ".{0,128}",
        arb_priority(),
        arb_date(),
        proptest::option::of(any::<u64>()),
        proptest::option::of(any::<u64>()),
    )
        .prop_map(
            |(id, title, description, content, priority, date, task_type, company)| Task {
                id: TaskId(id),
                title,
                description,
                content,
                priority,
                date,
                task_type: task_type.map(TaskTypeId),
                company: company.map(CompanyId),
            },
        )
}

fn arb_assignment(task_id: TaskId) -> impl Strategy<Value = Assignment> {
    (any::<u64>(), any::<u64>(), "[a-zA-Z ]{1,24}", arb_status(), ".{0,64}").prop_map(
        move |(id, user, user_name, status, detail)| Assignment {
            id: AssignmentId(id),
            task_id,
            user_id: UserId(user),
            user_name,
            status,
            detail,
        },
    )
}

fn arb_entry() -> impl Strategy<Value = TaskWithAssignments> {
    arb_task().prop_flat_map(|task| {
        let id = task.id;
        prop::collection::vec(arb_assignment(id), 0..4)
            .prop_map(move |assignments| TaskWithAssignments {
                task: task.clone(),
                assignments,
            })
    })
}

fn arb_mode() -> impl Strategy<Value = AssignmentMode> {
    prop_oneof![
        Just(AssignmentMode::None),
        Just(AssignmentMode::Random),
        any::<u64>().prop_map(|id| AssignmentMode::Manual { user_id: UserId(id) }),
    ]
}

proptest! {
    #[test]
    fn listing_survives_json(listing in prop::collection::vec(arb_entry(), 0..8)) {
        let json = serde_json::to_string(&listing).unwrap();
        let decoded: Vec<TaskWithAssignments> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(listing, decoded);
    }

    #[test]
    fn create_request_survives_json(task in arb_task(), mode in arb_mode()) {
        let req = CreateTaskRequest { task: TaskDraft::from(&task), assignment: mode };
        let json = serde_json::to_string(&req).unwrap();
        let decoded: CreateTaskRequest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(req, decoded);
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,256}") {
        let _ = serde_json::from_str::<Vec<TaskWithAssignments>>(&text);
    }
}
