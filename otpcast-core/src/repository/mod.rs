pub mod device;
pub mod identity_link;
pub mod sent_history;
pub mod user_settings;

pub use device::DeviceRepository;
pub use identity_link::IdentityLinkRepository;
pub use sent_history::SentHistoryRepository;
pub use user_settings::UserSettingsRepository;
