//! Backend records: payments, members and staff

pub mod member;
pub mod payment;
pub mod staff;
pub mod transfer;

pub use member::{Member, NewMember};
pub use payment::{
    MemberSnapshot, NewPayment, Payment, PaymentStatus, ReminderChannel, ReminderConfig,
};
pub use staff::{NewStaff, Staff};
pub use transfer::{DateRange, ExportFormat, ExportRequest, ExportedFile, ImportFile};
