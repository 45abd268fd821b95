pub mod booking;
pub mod document;
pub mod listing;

pub use booking::{
    Booking, BookingStatus, DepositStatus, DisputeStatus, FulfillmentMethod, PartyRole,
    PaymentStatus,
};
pub use document::{DocumentDeadline, DocumentRequirement, DocumentUpload, UploadApproval};
pub use listing::{BlockedDate, Listing, ListingCategory, ListingMode};
