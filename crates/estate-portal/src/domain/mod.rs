//! Records mirrored from the backend. Optional fields stay `Option` so a sparse
//! payload still decodes.

mod estate;
mod id;
mod landing;
mod notification;
mod people;
mod session;

pub use estate::{
    Category, Estate, EstateDraft, EstateFilter, EstatePatch, EstateRequest, EstateRequestDraft,
    EstateStatus, Region, RequestFilter, RequestStatus,
};
pub use id::EntityId;
pub use landing::{Landing, LandingPatch};
pub use notification::Notification;
pub use people::{
    AuthSession, Credentials, Owner, OwnerDraft, OwnerPatch, PeopleFilter, User, UserDraft,
    UserPatch, UserRole,
};
pub use session::{
    Reminder, ReminderDraft, ReminderFilter, Session, SessionDraft, SessionParticipant,
    SessionShare, SessionValidationError,
};
