//! Client side of the task API.
//!
//! [`TaskApiClient`] is constructed explicitly around an [`HttpTransport`],
//! so tests and alternative runtimes can swap the network out.
//! [`OwnerSession`] pairs a client with the owner key of a signed-in user.

mod api;
mod session;
mod transport;

pub use api::{ClientError, ClientResult, TaskApiClient};
pub use session::{
    Credential, IdentityError, IdentityProvider, OwnerSession, Principal, SessionError,
};
pub use transport::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
    join_segments,
};
