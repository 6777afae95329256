//! Task workflow engine
//!
//! Role- and relationship-dependent legality rules for task status
//! transitions, plus the coarser edit/completion gates. Pure decisions;
//! persistence happens in the store after a check passes.

mod engine;

pub use engine::{
    can_complete, can_edit_completion_details, can_edit_details, can_move_to, can_update_task,
    check_complete, check_move, legal_targets, WorkflowError,
};
