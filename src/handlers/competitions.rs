use std::path::PathBuf;

use super::{Handler, quiet};
use crate::api::{CompetitionListRequest, KaggleApi};
use crate::archive;
use crate::error::Error;
use crate::outcome::{Output, output};
use crate::params::Params;

fn competition(params: &Params) -> Result<String, Error> {
    params.required("COMPETITION", "competition").map(str::to_string)
}

#[derive(Debug)]
pub struct List {
    request: CompetitionListRequest,
}

impl Handler for List {
    fn from_params(params: &Params) -> Result<Self, Error> {
        // Listing is scoped to an invocation about one competition.
        competition(params)?;
        Ok(Self {
            request: CompetitionListRequest {
                group: params.optional("GROUP"),
                category: params.optional("CATEGORY"),
                sort_by: params.optional("SORT_BY"),
                page: params.number("PAGE", 1)?,
                search: params.optional("SEARCH"),
            },
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let competitions = api.competitions_list(&self.request).map_err(Error::remote)?;
        output("competitions", &competitions)
    }
}

#[derive(Debug)]
pub struct ListFiles {
    competition: String,
}

impl Handler for ListFiles {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            competition: competition(params)?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let files = api
            .competition_list_files(&self.competition)
            .map_err(Error::remote)?;
        output("files", &files)
    }
}

#[derive(Debug)]
pub struct Download {
    competition: String,
    destination: PathBuf,
    force: bool,
    quiet: bool,
    unzip: bool,
}

impl Handler for Download {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            competition: competition(params)?,
            destination: params.destination("DESTINATION")?,
            force: params.flag("FORCE", false),
            quiet: quiet(params),
            unzip: params.flag("UNZIP", true),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        log::debug!(
            "downloading {} to {} (force={} quiet={})",
            self.competition,
            self.destination.display(),
            self.force,
            self.quiet
        );
        let archive_path = api
            .competition_download_files(&self.competition, &self.destination, self.force, self.quiet)
            .map_err(Error::remote)?;

        let mut out = output("archive", &archive_path)?;
        if self.unzip {
            let extracted = archive::extract_nested(&archive_path, &self.destination)?;
            let extracted = serde_json::to_value(&extracted)
                .map_err(|e| Error::Extraction(format!("non UTF-8 extraction path: {e}")))?;
            out.insert("extracted".to_string(), extracted);
        }
        Ok(out)
    }
}

#[derive(Debug)]
pub struct Submit {
    file_name: PathBuf,
    competition: String,
    message: String,
    quiet: bool,
}

impl Handler for Submit {
    fn from_params(params: &Params) -> Result<Self, Error> {
        let file_name = params.required("FILE_NAME", "file name")?;
        Ok(Self {
            file_name: PathBuf::from(file_name),
            competition: competition(params)?,
            message: params.get("MESSAGE").unwrap_or_default().to_string(),
            quiet: quiet(params),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let result = api
            .competition_submit(&self.file_name, &self.message, &self.competition, self.quiet)
            .map_err(Error::remote)?;
        output("submission", &result)
    }
}

#[derive(Debug)]
pub struct ListSubmissions {
    competition: String,
    page: u32,
}

impl Handler for ListSubmissions {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            competition: competition(params)?,
            page: params.number("PAGE", 1)?,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let submissions = api
            .competition_submissions(&self.competition, self.page)
            .map_err(Error::remote)?;
        output("submissions", &submissions)
    }
}

/// Shows the leaderboard, or downloads it when `DOWNLOAD` is set.
#[derive(Debug)]
pub struct ViewLeaderboard {
    competition: String,
    download: Option<DownloadLeaderboard>,
}

impl Handler for ViewLeaderboard {
    fn from_params(params: &Params) -> Result<Self, Error> {
        let download = if params.flag("DOWNLOAD", false) {
            Some(DownloadLeaderboard::from_params(params)?)
        } else {
            None
        };
        Ok(Self {
            competition: competition(params)?,
            download,
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        if let Some(download) = self.download {
            return download.execute(api);
        }
        let leaderboard = api
            .competition_leaderboard_view(&self.competition)
            .map_err(Error::remote)?;
        output("leaderboard", &leaderboard)
    }
}

#[derive(Debug)]
pub struct DownloadLeaderboard {
    competition: String,
    destination: PathBuf,
    quiet: bool,
}

impl Handler for DownloadLeaderboard {
    fn from_params(params: &Params) -> Result<Self, Error> {
        Ok(Self {
            competition: competition(params)?,
            destination: params.destination("DESTINATION")?,
            quiet: quiet(params),
        })
    }

    fn execute(self, api: &dyn KaggleApi) -> Result<Output, Error> {
        let path = api
            .competition_leaderboard_download(&self.competition, &self.destination, self.quiet)
            .map_err(Error::remote)?;
        output("path", &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_checks_the_file_before_the_competition() {
        let params: Params = [("COMPETITION", "titanic")].into_iter().collect();
        let err = Submit::from_params(&params).unwrap_err();
        assert_eq!(err.to_string(), "must specify file name");
    }

    #[test]
    fn quiet_and_unzip_default_on() {
        let params: Params = [("COMPETITION", "titanic"), ("QUIET", "no")].into_iter().collect();
        let download = Download::from_params(&params).unwrap();
        assert!(!download.quiet);
        assert!(download.unzip);
        assert!(!download.force);
        assert!(download.destination.is_absolute());
    }

    #[test]
    fn leaderboard_download_is_opt_in() {
        let params: Params = [("COMPETITION", "titanic")].into_iter().collect();
        assert!(ViewLeaderboard::from_params(&params).unwrap().download.is_none());

        let params: Params = [("COMPETITION", "titanic"), ("DOWNLOAD", "Yes")]
            .into_iter()
            .collect();
        assert!(ViewLeaderboard::from_params(&params).unwrap().download.is_some());
    }

    #[test]
    fn malformed_page_is_a_validation_error() {
        let params: Params = [("COMPETITION", "titanic"), ("PAGE", "two")].into_iter().collect();
        let err = ListSubmissions::from_params(&params).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
