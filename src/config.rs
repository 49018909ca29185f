pub mod env_var {
    use std::str::FromStr;

    use lazy_static::lazy_static;

    lazy_static! {
        static ref ENV_VAR: EnvVar = load_env();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum UserStore {
        Postgres,
        Memory,
    }

    impl FromStr for UserStore {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "postgres" => Ok(Self::Postgres),
                "memory" => Ok(Self::Memory),
                other => Err(format!("unknown user store {other:?}")),
            }
        }
    }

    /// Postgres connection target. The password only lives inside `url`.
    #[derive(Clone)]
    pub struct DatabaseEnv {
        pub host: String,
        pub port: u16,
        pub name: String,
        pub user: String,
        pub url: String,
    }

    impl std::fmt::Debug for DatabaseEnv {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DatabaseEnv")
                .field("host", &self.host)
                .field("port", &self.port)
                .field("name", &self.name)
                .field("user", &self.user)
                .finish_non_exhaustive()
        }
    }

    #[derive(Debug, Clone)]
    pub struct EnvVar {
        pub port: u16,
        pub log_level: String,
        pub user_store: UserStore,
        /// Present only when the postgres user store is selected.
        pub database: Option<DatabaseEnv>,
    }

    macro_rules! get_env {
        ($env:literal) => {
            std::env::var($env).expect(concat!("Missing env var ", $env))
        };
    }

    fn load_database_env() -> DatabaseEnv {
        let host = get_env!("DATABASE_HOST");
        let name = get_env!("DATABASE_NAME");
        let user = get_env!("DATABASE_USER");
        let password = get_env!("DATABASE_PASSWORD");
        let port: u16 = get_env!("DATABASE_PORT")
            .parse()
            .expect("Invalid DATABASE_PORT");

        let url = format!("postgres://{user}:{password}@{host}:{port}/{name}");

        DatabaseEnv {
            host,
            port,
            name,
            user,
            url,
        }
    }

    fn load_env() -> EnvVar {
        let port: u16 = get_env!("PORT").parse().expect("Invalid PORT");
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
        let user_store: UserStore = std::env::var("USER_STORE")
            .map(|store| store.parse().expect("Invalid USER_STORE"))
            .unwrap_or(UserStore::Postgres);

        let database = match user_store {
            UserStore::Postgres => Some(load_database_env()),
            UserStore::Memory => None,
        };

        EnvVar {
            port,
            log_level,
            user_store,
            database,
        }
    }

    pub fn get() -> &'static EnvVar {
        &ENV_VAR
    }

}
