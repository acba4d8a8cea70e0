//! The client entry point: pairing, credentials and space-level calls.

use crate::core::api::unwrap_envelope;
use crate::core::settings::{self, ClientSettings};
use crate::core::space::space_from;
use crate::{
    AnytypeError, ApiClient, Page, Result, Space, SpaceClient, TypedObject, ValidationError,
};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// An Anytype API client bound to its persisted settings.
#[derive(Debug)]
pub struct Anytype {
    api: ApiClient,
    settings: ClientSettings,
    settings_path: PathBuf,
}

impl Anytype {
    /// Opens a client with the settings stored at [`settings::settings_file_path`].
    pub fn new() -> Result<Self> {
        Self::with_settings(settings::load_settings(), settings::settings_file_path())
    }

    /// Opens a client with explicit settings, persisting new credentials to `path`.
    pub fn with_settings(settings: ClientSettings, path: impl Into<PathBuf>) -> Result<Self> {
        let mut api = ApiClient::new(&settings.api_url, &settings.app_name)?;
        api.set_app_key(settings.app_key.clone());
        Ok(Self {
            api,
            settings,
            settings_path: path.into(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.app_key().is_some()
    }

    /// Authenticates, reusing a stored app key unless `force` is set.
    ///
    /// Otherwise asks the app to display a code and calls `prompt` with the
    /// challenge id to obtain the 4-digit code the user sees. The resulting
    /// app key is saved to the settings file.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] if the prompt returns an empty code,
    /// plus any transport or persistence error.
    pub fn auth<F>(&mut self, force: bool, prompt: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        if !force && self.validate_token()? {
            log::debug!("reusing stored app key");
            return Ok(());
        }
        let challenge_id = self.api.display_code()?;
        let code = prompt(&challenge_id)?;
        self.complete_auth(&challenge_id, &code)
    }

    fn complete_auth(&mut self, challenge_id: &str, code: &str) -> Result<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingField("code").into());
        }
        let app_key = self.api.get_token(challenge_id, code)?;
        self.api.set_app_key(Some(app_key.clone()));
        self.settings.app_key = Some(app_key);
        settings::save_to(&self.settings_path, &self.settings)?;
        log::info!("paired as '{}'", self.settings.app_name);
        Ok(())
    }

    /// Whether the stored app key is accepted by the API.
    ///
    /// # Errors
    ///
    /// Transport failures other than an authorization rejection.
    pub fn validate_token(&self) -> Result<bool> {
        if !self.is_authenticated() {
            return Ok(false);
        }
        match self.get_spaces(Page::new(0, 1)) {
            Ok(_) => Ok(true),
            Err(AnytypeError::Api { status: 401 | 403, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn require_auth(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AnytypeError::NotAuthenticated)
        }
    }

    pub fn get_spaces(&self, page: Page) -> Result<Vec<Space>> {
        self.require_auth()?;
        Ok(self.api.list("/spaces", page)?.data)
    }

    pub fn get_space(&self, space_id: &str) -> Result<Space> {
        self.require_auth()?;
        self.api.get_record(&format!("/spaces/{space_id}"), "space")
    }

    pub fn create_space(&self, name: &str) -> Result<Space> {
        self.require_auth()?;
        space_from(self.api.post("/spaces", &json!({ "name": name }))?)
    }

    pub fn update_space(&self, space_id: &str, name: &str, description: &str) -> Result<Space> {
        self.require_auth()?;
        let body = self.api.patch(
            &format!("/spaces/{space_id}"),
            &json!({ "name": name, "description": description }),
        )?;
        unwrap_envelope(body, "space")
    }

    /// Searches across all spaces, optionally limited to type keys.
    pub fn global_search(&self, query: &str, types: &[String], page: Page) -> Result<Vec<TypedObject>> {
        self.require_auth()?;
        self.api
            .search("/search", query, types, page)?
            .data
            .into_iter()
            .map(|v| TypedObject::from_record(serde_json::from_value(v)?))
            .collect()
    }

    /// Operations scoped to one space.
    pub fn space(&self, space_id: &str) -> Result<SpaceClient<'_>> {
        self.require_auth()?;
        SpaceClient::new(&self.api, space_id)
    }
}

/// Reads the pairing code from standard input, for use as the `auth` prompt.
pub fn prompt_code_from_stdin(_challenge_id: &str) -> Result<String> {
    print!("Enter the 4-digit code shown in the Anytype app: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn client(dir: &TempDir, app_key: Option<&str>) -> Anytype {
        let settings = ClientSettings {
            app_key: app_key.map(str::to_string),
            ..ClientSettings::default()
        };
        Anytype::with_settings(settings, dir.path().join("settings.json")).unwrap()
    }

    #[test]
    fn test_calls_require_app_key() {
        let dir = TempDir::new().unwrap();
        let anytype = client(&dir, None);
        assert!(!anytype.is_authenticated());
        assert!(matches!(
            anytype.get_spaces(Page::default()),
            Err(AnytypeError::NotAuthenticated)
        ));
        assert!(matches!(anytype.space("s1"), Err(AnytypeError::NotAuthenticated)));
        assert!(!anytype.validate_token().unwrap());
    }

    #[test]
    fn test_stored_key_is_loaded() {
        let dir = TempDir::new().unwrap();
        let anytype = client(&dir, Some("key-1"));
        assert!(anytype.is_authenticated());
        assert_eq!(anytype.api().app_key(), Some("key-1"));
        assert_eq!(anytype.space("s1").unwrap().id(), "s1");
    }

    #[test]
    fn test_empty_code_is_rejected_before_any_request() {
        let dir = TempDir::new().unwrap();
        let mut anytype = client(&dir, None);
        let err = anytype.complete_auth("challenge", "  ").unwrap_err();
        assert!(matches!(
            err,
            AnytypeError::Validation(ValidationError::MissingField("code"))
        ));
        assert!(!dir.path().join("settings.json").exists());
    }
}
