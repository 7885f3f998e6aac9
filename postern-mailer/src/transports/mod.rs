mod file;
mod sendgrid;

pub use file::FileTransport;
pub use sendgrid::SendGridTransport;
