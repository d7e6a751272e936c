pub mod accessibility_features;
pub mod accessibility_panel;
pub mod notice_board;
pub mod sync_conflict_dialog;

pub use accessibility_features::AccessibilityFeatures;
pub use accessibility_panel::AccessibilityPanel;
pub use notice_board::NoticeBoard;
pub use sync_conflict_dialog::SyncConflictDialog;
