use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use config::{File, FileFormat};
use serde::Deserialize;
use tracing::warn;

use crate::domain::{AppError, Credentials};

/// Where the basic-auth credentials live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStore {
    /// First line is `username,password`.
    Flat(PathBuf),
    /// `[AUTH]` section with `username` and `password` keys.
    Ini(PathBuf),
}

#[derive(Debug, Default, Deserialize)]
struct IniFile {
    #[serde(default, alias = "AUTH")]
    auth: AuthSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthSection {
    username: String,
    password: String,
}

impl CredentialStore {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_flat = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_flat {
            CredentialStore::Flat(path)
        } else {
            CredentialStore::Ini(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CredentialStore::Flat(path) | CredentialStore::Ini(path) => path,
        }
    }

    /// Strict load: a missing file or an empty field is an error.
    pub fn load(&self) -> Result<Credentials, AppError> {
        let credentials = self.read()?;
        if !credentials.is_complete() {
            return Err(AppError::AuthLoad(format!(
                "{} has an empty username or password",
                self.path().display()
            )));
        }
        Ok(credentials)
    }

    /// Prefill for editable fields; anything unreadable yields empty credentials.
    pub fn load_or_default(&self) -> Credentials {
        if !self.path().exists() {
            return Credentials::default();
        }
        self.read().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable credentials file");
            Credentials::default()
        })
    }

    pub fn save(&self, credentials: &Credentials) -> io::Result<()> {
        let content = match self {
            CredentialStore::Flat(_) => {
                format!("{},{}\n", credentials.username, credentials.password)
            }
            CredentialStore::Ini(_) => format!(
                "[AUTH]\nusername = {}\npassword = {}\n",
                quote_ini_value(&credentials.username),
                quote_ini_value(&credentials.password)
            ),
        };

        if let Some(parent) = self.path().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(self.path(), content)
    }

    fn read(&self) -> Result<Credentials, AppError> {
        let path = self.path();
        if !path.exists() {
            return Err(AppError::AuthLoad(format!(
                "credentials file not found: {}",
                path.display()
            )));
        }

        match self {
            CredentialStore::Flat(path) => read_flat(path),
            CredentialStore::Ini(path) => read_ini(path),
        }
    }
}

fn read_flat(path: &Path) -> Result<Credentials, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::AuthLoad(format!("{}: {}", path.display(), e)))?;

    let first_line = content.lines().next().unwrap_or("").trim();
    let (username, password) = first_line.split_once(',').ok_or_else(|| {
        AppError::AuthLoad(format!(
            "{}: expected `username,password` on the first line",
            path.display()
        ))
    })?;

    Ok(Credentials::new(username, password))
}

fn read_ini(path: &Path) -> Result<Credentials, AppError> {
    let parsed: IniFile = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|e| AppError::AuthLoad(format!("{}: {}", path.display(), e)))?;

    Ok(Credentials::new(parsed.auth.username, parsed.auth.password))
}

/// Double-quote a value using the escapes the INI reader understands, so
/// backslashes, quotes and surrounding spaces survive a save and reload.
fn quote_ini_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\0' => quoted.push_str("\\0"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            '\n' => quoted.push_str("\\n"),
            c if c.is_ascii_control() => quoted.push_str(&format!("\\x{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_kind_follows_extension() {
        assert!(matches!(
            CredentialStore::from_path("authentication.txt"),
            CredentialStore::Flat(_)
        ));
        assert!(matches!(
            CredentialStore::from_path("config.ini"),
            CredentialStore::Ini(_)
        ));
    }

    #[test]
    fn test_flat_file_first_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("authentication.txt");
        fs::write(&path, "alice,secret\nignored,line\n").unwrap();

        let credentials = CredentialStore::from_path(&path).load().unwrap();
        assert_eq!(credentials, Credentials::new("alice", "secret"));
    }

    #[test]
    fn test_flat_file_without_comma_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("authentication.txt");
        fs::write(&path, "alice secret\n").unwrap();

        let err = CredentialStore::from_path(&path).load().unwrap_err();
        assert!(matches!(err, AppError::AuthLoad(_)));
    }

    #[test]
    fn test_missing_file_is_auth_error() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::from_path(dir.path().join("authentication.txt"));

        assert!(matches!(store.load(), Err(AppError::AuthLoad(_))));
        assert_eq!(store.load_or_default(), Credentials::default());
    }

    #[test]
    fn test_ini_auth_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[AUTH]\nusername = alice\npassword = secret\n").unwrap();

        let credentials = CredentialStore::from_path(&path).load().unwrap();
        assert_eq!(credentials, Credentials::new("alice", "secret"));
    }

    #[test]
    fn test_ini_empty_password_fails_strict_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[AUTH]\nusername = alice\n").unwrap();

        let store = CredentialStore::from_path(&path);
        assert!(matches!(store.load(), Err(AppError::AuthLoad(_))));
        assert_eq!(store.load_or_default().username, "alice");
    }

    #[test]
    fn test_ini_save_then_load() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::from_path(dir.path().join("nested/config.ini"));

        store.save(&Credentials::new("bob", "hunter2")).unwrap();
        assert_eq!(store.load().unwrap(), Credentials::new("bob", "hunter2"));
    }

    #[test]
    fn test_ini_save_keeps_special_characters() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::from_path(dir.path().join("config.ini"));

        let passwords = [r#"p\ass"word"#, r#""quoted""#, " padded ", r"C:\new\tmp", "semi;colon#x"];
        for password in passwords {
            let credentials = Credentials::new("bob", password);
            store.save(&credentials).unwrap();
            assert_eq!(store.load().unwrap(), credentials, "password {:?}", password);
        }
    }
}
