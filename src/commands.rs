use crate::{
    Result,
    Vpki,
};

pub mod issue;

/// Dispatches the command.
///
/// vpki does one thing: it obtains a certificate.  Whether the
/// authority signs a request or generates a key is decided by
/// `--csr`.
pub fn dispatch(vpki: Vpki) -> Result<()> {
    issue::dispatch(vpki)
}
