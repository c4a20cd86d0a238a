//! One handler per operation. A handler is built from the parameter bag,
//! which is where validation happens, and is then executed against a client.

pub mod competitions;
pub mod datasets;
pub mod debug;
pub mod kernels;

use crate::api::KaggleApi;
use crate::error::Error;
use crate::outcome::Output;
use crate::params::Params;

pub trait Handler: Sized {
    /// Reads and validates this operation's parameters.
    fn from_params(params: &Params) -> Result<Self, Error>;

    /// Performs the operation and shapes its output.
    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error>;
}

/// A validated handler waiting for a client.
pub(crate) type Prepared = Box<dyn FnOnce(&dyn KaggleApi) -> Result<Output, Error>>;

pub(crate) fn prepare<H: Handler + 'static>(params: &Params) -> Result<Prepared, Error> {
    let handler = H::from_params(params)?;
    Ok(Box::new(move |api: &dyn KaggleApi| handler.execute(api)))
}

fn quiet(params: &Params) -> bool {
    params.flag("QUIET", true)
}
