use std::path::PathBuf;

use super::{Handler, quiet};
use crate::api::{DatasetCreateRequest, DatasetListRequest, DatasetVersionRequest, DirMode, KaggleApi};
use crate::error::Error;
use crate::outcome::{Output, output};
use crate::params::Params;

fn dataset(params: &Params) -> Result<String, Error> {
    params.required("DATASET", "dataset").map(str::to_string)
}

fn dir_mode(params: &Params) -> Result<DirMode, Error> {
    params
        .non_empty("DIR_MODE")
        .map(str::parse::<DirMode>)
        .transpose()
        .map(Option::unwrap_or_default)
}

#[derive(Debug)]
pub struct List {
    request: DatasetListRequest,
}

impl Handler for List {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            request: DatasetListRequest {
                sort_by: params.optional("SORT_BY"),
                size: params.optional("SIZE"),
                file_type: params.optional("FILE_TYPE"),
                license_name: params.optional("LICENSE_NAME"),
                tag_ids: params.optional("TAG_IDS"),
                search: params.optional("SEARCH"),
                user: params.optional("USER"),
                mine: params.flag("MINE", false),
                page: params.number("PAGE", 1)?,
                max_size: Some(params.number("MAX_SIZE", 100_000)?),
                min_size: Some(params.number("MIN_SIZE", 0)?),
            },
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let datasets = api.dataset_list(&self.request).map_err(Error::remote)?;
        output("datasets", &datasets)
    }
}

#[derive(Debug)]
pub struct ListFiles {
    dataset: String,
}

impl Handler for ListFiles {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            dataset: dataset(params)?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let files = api.dataset_list_files(&self.dataset).map_err(Error::remote)?;
        output("files", &files)
    }
}

/// Downloads the whole dataset, or one file of it when `FILE_NAME` is set.
#[derive(Debug)]
pub struct Download {
    dataset: String,
    destination: PathBuf,
    unzip: bool,
    force: bool,
    quiet: bool,
    single: Option<DownloadFile>,
}

impl Handler for Download {
    fn from_params(params: &Params) -> Result<Self, Error> {
        let single = match params.non_empty("FILE_NAME") {
            Some(_) => Some(DownloadFile::from_params(params)?),
            None => None,
        };
        Ok(Self {
            dataset: dataset(params)?,
            destination: params.destination("DESTINATION")?,
            unzip: params.flag("UNZIP", false),
            force: params.flag("FORCE", false),
            quiet: quiet(params),
            single,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        if let Some(single) = self.single {
            return single.execute(api);
        }
        let path = api
            .dataset_download_files(&self.dataset, &self.destination, self.unzip, self.force, self.quiet)
            .map_err(Error::remote)?;
        output("path", &path)
    }
}

#[derive(Debug)]
pub struct DownloadFile {
    dataset: String,
    file_name: String,
    destination: PathBuf,
    force: bool,
    quiet: bool,
}

impl Handler for DownloadFile {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            dataset: dataset(params)?,
            file_name: params.required("FILE_NAME", "file name")?.to_string(),
            destination: params.destination("DESTINATION")?,
            force: params.flag("FORCE", false),
            quiet: quiet(params),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let path = api
            .dataset_download_file(
                &self.dataset,
                &self.file_name,
                &self.destination,
                self.force,
                self.quiet,
            )
            .map_err(Error::remote)?;
        output("path", &path)
    }
}

#[derive(Debug)]
pub struct Create {
    request: DatasetCreateRequest,
}

impl Handler for Create {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            request: DatasetCreateRequest {
                folder: params.folder("FOLDER")?,
                public: params.flag("PUBLIC", false),
                quiet: quiet(params),
                convert_to_csv: params.flag("CONVERT_TO_CSV", false),
                dir_mode: dir_mode(params)?,
            },
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let created = api.dataset_create_new(&self.request).map_err(Error::remote)?;
        output("dataset", &created)
    }
}

#[derive(Debug)]
pub struct NewVersion {
    request: DatasetVersionRequest,
}

impl Handler for NewVersion {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            request: DatasetVersionRequest {
                folder: params.folder("FOLDER")?,
                version_notes: params.optional("VERSION_NOTES"),
                quiet: quiet(params),
                convert_to_csv: params.flag("CONVERT_TO_CSV", false),
                delete_old_versions: params.flag("DELETE_OLD_VERSIONS", false),
                dir_mode: dir_mode(params)?,
            },
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let created = api
            .dataset_create_version(&self.request)
            .map_err(Error::remote)?;
        output("dataset", &created)
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
        let path = api.dataset_initialize(&self.folder).map_err(Error::remote)?;
        output("path", &path)
    }
}

/// Fetches the metadata file, or uploads it when `UPDATE` is set.
#[derive(Debug)]
pub struct GetMetadata {
    dataset: String,
    destination: PathBuf,
    update: Option<UpdateMetadata>,
}

impl Handler for GetMetadata {
    fn from_params(params: &Params) -> Result<Self, Error> {
        let update = if params.flag("UPDATE", false) {
            Some(UpdateMetadata::from_params(params)?)
        } else {
            None
        };
        Ok(Self {
            dataset: dataset(params)?,
            destination: params.destination("DESTINATION")?,
            update,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        if let Some(update) = self.update {
            return update.execute(api);
        }
        let path = api
            .dataset_metadata(&self.dataset, &self.destination)
            .map_err(Error::remote)?;
        output("path", &path)
    }
}

#[derive(Debug)]
pub struct UpdateMetadata {
    dataset: String,
    destination: PathBuf,
}

impl Handler for UpdateMetadata {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            dataset: dataset(params)?,
            destination: params.destination("DESTINATION")?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        api.dataset_metadata_update(&self.dataset, &self.destination)
            .map_err(Error::remote)?;
        Ok(Output::new())
    }
}

#[derive(Debug)]
pub struct Status {
    dataset: String,
}

impl Handler for Status {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            dataset: dataset(params)?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let status = api.dataset_status(&self.dataset).map_err(Error::remote)?;
        output("status", &status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn file_name_switches_to_a_single_file_download() {
        let params: Params = [("DATASET", "zillow/zecon"), ("FILE_NAME", "Zip_time_series.csv")]
            .into_iter()
            .collect();
        let download = Download::from_params(&params).unwrap();
        let single = download.single.expect("single-file download");
        assert_eq!(single.file_name, "Zip_time_series.csv");
    }

    #[test]
    fn dir_mode_defaults_to_skip_and_rejects_unknown_values() {
        let version = NewVersion::from_params(&Params::default()).unwrap();
        assert_eq!(version.request.dir_mode, DirMode::Skip);
        assert_eq!(version.request.version_notes, None);
        assert!(!version.request.delete_old_versions);

        let params: Params = [("DIR_MODE", "tar")].into_iter().collect();
        let err = Create::from_params(&params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("DIR_MODE"));
    }

    #[test]
    fn download_leaves_the_archive_zipped_unless_asked() {
        let params: Params = [("DATASET", "zillow/zecon")].into_iter().collect();
        assert!(!Download::from_params(&params).unwrap().unzip);

        let params: Params = [("DATASET", "zillow/zecon"), ("UNZIP", "yes")].into_iter().collect();
        assert!(Download::from_params(&params).unwrap().unzip);
    }

    #[test]
    fn list_parses_size_bounds() {
        let params: Params = [("MAX_SIZE", "1048576"), ("MINE", "t")].into_iter().collect();
        let list = List::from_params(&params).unwrap();
        assert_eq!(list.request.max_size, Some(1_048_576));
        assert_eq!(list.request.min_size, Some(0));
        assert!(list.request.mine);
        assert_eq!(list.request.page, 1);
    }
}
