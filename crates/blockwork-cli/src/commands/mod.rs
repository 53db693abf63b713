pub(crate) mod create;
pub(crate) mod init;
pub(crate) mod scaffold;
pub(crate) mod setup;
pub(crate) mod verify;
