//! Data models module
//!
//! This module contains all data structures exchanged with the attendance backend

pub mod attendance;
pub mod notification;
pub mod session;
pub mod submission;
pub mod token;
pub mod user;

// Re-export commonly used models
pub use attendance::{Attendance, AttendanceStatus, AttendanceStats, AttendanceReceipt, CreateAttendanceRequest, UpdateAttendanceRequest, Page, PageRequest, StudentFilter, AttendanceFilter, StatsFilter};
pub use notification::{Notification, Priority};
pub use session::{AttendanceSession, SessionDuration, CreateSessionRequest, CreatedSession, SessionList, SessionReport, SessionAttendance};
pub use submission::{AttendanceSubmission, ScanReceipt};
pub use token::{SessionToken, ScannedPayload};
pub use user::{Student, Admin, UserType, Profile, LoginRequest, StudentRegisterRequest, UpdateStudentRequest, AuthResponse};
