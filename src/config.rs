use crate::error::{BadEnvVarSnafu, ParseSocketAddrSnafu, StudentsResult};
use snafu::ResultExt;
use std::{net::SocketAddr, path::PathBuf};

pub const SERVER_IP_VAR: &str = "STUDENTS_SERVER_IP";
pub const DB_PATH_VAR: &str = "STUDENTS_DB_PATH";

const DEFAULT_SERVER_IP: &str = "127.0.0.1:3000";
const DEFAULT_DB_PATH: &str = "db.json";
///a `STUDENTS_DB_PATH` that keeps everything in memory instead
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatastoreLocation {
    File(PathBuf),
    InMemory,
}

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: SocketAddr,
    datastore: DatastoreLocation,
}

impl RuntimeConfiguration {
    pub fn new() -> StudentsResult<Self> {
        Self::from_lookup(|name| match dotenvy::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
            Err(source) => Err(source).context(BadEnvVarSnafu { name }),
        })
    }

    ///builds from any source of variables, `Ok(None)` meaning unset
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> StudentsResult<Option<String>>,
    ) -> StudentsResult<Self> {
        let server_ip = lookup(SERVER_IP_VAR)?.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let server_ip = server_ip
            .parse()
            .context(ParseSocketAddrSnafu { original: server_ip })?;

        let datastore = match lookup(DB_PATH_VAR)? {
            Some(path) if path == IN_MEMORY_DB_PATH => DatastoreLocation::InMemory,
            Some(path) if !path.trim().is_empty() => DatastoreLocation::File(path.into()),
            _ => DatastoreLocation::File(DEFAULT_DB_PATH.into()),
        };

        Ok(Self {
            server_ip,
            datastore,
        })
    }

    pub const fn server_ip(&self) -> SocketAddr {
        self.server_ip
    }

    pub const fn datastore(&self) -> &DatastoreLocation {
        &self.datastore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudentsError;
    use std::collections::HashMap;

    fn config_from(vars: &[(&'static str, &str)]) -> StudentsResult<RuntimeConfiguration> {
        let vars: HashMap<_, _> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        RuntimeConfiguration::from_lookup(|name| Ok(vars.get(name).cloned()))
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server_ip().to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.datastore(),
            &DatastoreLocation::File(PathBuf::from("db.json"))
        );
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            (SERVER_IP_VAR, "0.0.0.0:8080"),
            (DB_PATH_VAR, "/var/lib/students/db.json"),
        ])
        .unwrap();

        assert_eq!(config.server_ip().port(), 8080);
        assert_eq!(
            config.datastore(),
            &DatastoreLocation::File(PathBuf::from("/var/lib/students/db.json"))
        );
    }

    #[test]
    fn in_memory_datastore() {
        let config = config_from(&[(DB_PATH_VAR, ":memory:")]).unwrap();
        assert_eq!(config.datastore(), &DatastoreLocation::InMemory);
    }

    #[test]
    fn bad_server_ip() {
        let err = config_from(&[(SERVER_IP_VAR, "localhost")]).unwrap_err();
        assert!(matches!(err, StudentsError::ParseSocketAddr { .. }));
    }
}
