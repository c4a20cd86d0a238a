use std::path::PathBuf;

use super::{Handler, quiet};
use crate::api::{KaggleApi, KernelListRequest};
use crate::error::Error;
use crate::outcome::{Output, output};
use crate::params::Params;

fn kernel(params: &Params) -> Result<String, Error> {
    params.required("KERNEL", "kernel").map(str::to_string)
}

#[derive(Debug)]
pub struct List {
    request: KernelListRequest,
}

impl Handler for List {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            request: KernelListRequest {
                page: params.number("PAGE", 1)?,
                page_size: params.number("PAGE_SIZE", 36)?,
                search: params.optional("SEARCH"),
                mine: params.flag("MINE", false),
                dataset: Some(params.required("DATASET", "dataset")?.to_string()),
                competition: params.optional("COMPETITION"),
                parent_kernel: params.optional("PARENT_KERNEL"),
                user: params.optional("USER"),
                language: params.optional("LANGUAGE"),
                kernel_type: params.optional("KERNEL_TYPE"),
                output_type: params.optional("OUTPUT_TYPE"),
                sort_by: params.optional("SORT_BY"),
            },
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let kernels = api.kernels_list(&self.request).map_err(Error::remote)?;
        output("kernels", &kernels)
    }
}

#[derive(Debug)]
pub struct Initialize {
    folder: PathBuf,
}

impl Handler for Initialize {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            folder: params.folder("FOLDER")?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let path = api.kernels_initialize(&self.folder).map_err(Error::remote)?;
        output("path", &path)
    }
}

#[derive(Debug)]
pub struct Push {
    folder: PathBuf,
}

impl Handler for Push {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            folder: params.folder("FOLDER")?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let pushed = api.kernels_push(&self.folder).map_err(Error::remote)?;
        output("kernel", &pushed)
    }
}

#[derive(Debug)]
pub struct Pull {
    kernel: String,
    destination: PathBuf,
    metadata: bool,
    quiet: bool,
}

impl Handler for Pull {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            kernel: kernel(params)?,
            destination: params.destination("DESTINATION")?,
            metadata: params.flag("METADATA", false),
            quiet: quiet(params),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let path = api
            .kernels_pull(&self.kernel, &self.destination, self.metadata, self.quiet)
            .map_err(Error::remote)?;
        output("path", &path)
    }
}

#[derive(Debug)]
pub struct GetOutput {
    kernel: String,
    destination: PathBuf,
    force: bool,
    quiet: bool,
}

impl Handler for GetOutput {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            kernel: kernel(params)?,
            destination: params.destination("DESTINATION")?,
            force: params.flag("FORCE", false),
            quiet: quiet(params),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let files = api
            .kernels_output(&self.kernel, &self.destination, self.force, self.quiet)
            .map_err(Error::remote)?;
        output("files", &files)
    }
}

#[derive(Debug)]
pub struct Status {
    kernel: String,
}

impl Handler for Status {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            kernel: kernel(params)?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let status = api.kernels_status(&self.kernel).map_err(Error::remote)?;
        output("status", &status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_defaults() {
        let params: Params = [("DATASET", "alice/housing")].into_iter().collect();
        let list = List::from_params(&params).unwrap();
        assert_eq!(list.request.dataset.as_deref(), Some("alice/housing"));
        assert_eq!(list.request.page, 1);
        assert_eq!(list.request.page_size, 36);
        assert!(!list.request.mine);
        assert_eq!(list.request.language, None);
    }

    #[test]
    fn list_requires_a_dataset() {
        let err = List::from_params(&Params::default()).unwrap_err();
        assert_eq!(err.to_string(), "must specify dataset");
    }

    #[test]
    fn pull_requires_a_kernel() {
        let err = Pull::from_params(&Params::default()).unwrap_err();
        assert_eq!(err.to_string(), "must specify kernel");
    }
}
