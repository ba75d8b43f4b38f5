//! 命令行定义
//!
//! 每个选项只声明一次，短/长两种写法的所有出现值被收集为列表，
//! 再交给 [`filecli_core::params`] 合并。

use clap::{ArgAction, Args, Parser, Subcommand};
use filecli_core::config::{DEFAULT_DIRECTORY, DEFAULT_PORT, DEFAULT_PROTOCOL};
use filecli_core::params::{self, OptionName, ParamError};
use filecli_core::{LogLevel, ServerConfig};

const BIND: OptionName = OptionName::new('b', "bind");
const DIRECTORY: OptionName = OptionName::new('d', "directory");
const PROTOCOL: OptionName = OptionName::new('p', "protocol");
const SERVER: OptionName = OptionName::new('s', "server");
const PORT: OptionName = OptionName::new('p', "port");
const LFILE: OptionName = OptionName::new('l', "lfile");
const RFILE: OptionName = OptionName::new('r', "rfile");

const VERSION_INFO: &str = concat!(
    "version v",
    env!("CARGO_PKG_VERSION"),
    "\nAuthor: ",
    env!("CARGO_PKG_AUTHORS"),
    "\nGitHub: ",
    env!("CARGO_PKG_REPOSITORY"),
);

const ROUTES_HELP: &str = "Download route: /\nUpload   route: /upload-form\n\n\
Run 'filecli upload -h' or 'filecli download -h' to get help on the subcommands.";

#[derive(Parser, Debug)]
#[command(
    name = "filecli",
    version = VERSION_INFO,
    about = "Static file server with upload support, plus a matching client",
    long_about = "Default: start the file server.",
    after_help = ROUTES_HELP,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    #[command(flatten)]
    pub server: ServerArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload files to the server
    Upload(UploadArgs),
    /// Download files from server
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Bind to this address (default all interfaces)
    #[arg(short = 'b', long = "bind", value_name = "ADDR", action = ArgAction::Append)]
    pub bind: Vec<String>,

    /// Serve this directory (default current directory)
    #[arg(short = 'd', long = "directory", value_name = "DIR", action = ArgAction::Append)]
    pub directory: Vec<String>,

    /// HTTP protocol version to use (HTTP/1.0 or HTTP/1.1) [default: HTTP/1.0]
    #[arg(short = 'p', long = "protocol", value_name = "VERSION", action = ArgAction::Append)]
    pub protocol: Vec<String>,

    /// Port number to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServerArgs {
    /// 合并参数并校验配置
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let bind = params::resolve(BIND, &self.bind, String::new())?;
        let directory = params::resolve(DIRECTORY, &self.directory, DEFAULT_DIRECTORY.to_string())?;
        let protocol = params::resolve(PROTOCOL, &self.protocol, DEFAULT_PROTOCOL.to_string())?;

        Ok(ServerConfig::new(
            Some(bind),
            self.port,
            directory,
            &protocol,
        )?)
    }
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Server Address (required)
    #[arg(short = 's', long = "server", value_name = "HOST", action = ArgAction::Append)]
    pub server: Vec<String>,

    /// Server Port (required)
    #[arg(short = 'p', long = "port", value_name = "PORT", action = ArgAction::Append)]
    pub port: Vec<u16>,

    /// Local file path (required)
    #[arg(short = 'l', long = "lfile", value_name = "PATH", action = ArgAction::Append)]
    pub lfile: Vec<String>,

    /// Remote save file name (optional, defaults to the same as the local file name)
    #[arg(short = 'r', long = "rfile", value_name = "NAME", action = ArgAction::Append)]
    pub rfile: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Server Address (required)
    #[arg(short = 's', long = "server", value_name = "HOST", action = ArgAction::Append)]
    pub server: Vec<String>,

    /// Server Port (required)
    #[arg(short = 'p', long = "port", value_name = "PORT", action = ArgAction::Append)]
    pub port: Vec<u16>,

    /// Remote file path (required)
    #[arg(short = 'r', long = "rfile", value_name = "PATH", action = ArgAction::Append)]
    pub rfile: Vec<String>,

    /// Local save path (optional, defaults to the same as the remote file name)
    #[arg(short = 'l', long = "lfile", value_name = "PATH", action = ArgAction::Append)]
    pub lfile: Vec<String>,
}

/// 合并后的传输参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub server: String,
    pub port: u16,
    pub local: String,
    pub remote: String,
}

impl UploadArgs {
    pub fn resolve(&self) -> Result<Transfer, ParamError> {
        let server = params::resolve_required(SERVER, "server address", &self.server)?;
        let port = params::resolve_required(PORT, "server port", &self.port)?;
        let local = params::resolve_required(LFILE, "local file path", &self.lfile)?;
        let remote = params::resolve(RFILE, &self.rfile, String::new())?;

        Ok(Transfer {
            server,
            port,
            local,
            remote,
        })
    }
}

impl DownloadArgs {
    pub fn resolve(&self) -> Result<Transfer, ParamError> {
        let server = params::resolve_required(SERVER, "server address", &self.server)?;
        let port = params::resolve_required(PORT, "server port", &self.port)?;
        let remote = params::resolve_required(RFILE, "remote file path", &self.rfile)?;
        let local = params::resolve(LFILE, &self.lfile, String::new())?;

        Ok(Transfer {
            server,
            port,
            local,
            remote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use filecli_core::HttpProtocol;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_server_defaults() {
        let cli = Cli::try_parse_from(["filecli"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, LogLevel::Info);

        let config = cli.server.into_config().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind, None);
        assert_eq!(config.protocol, HttpProtocol::Http10);
    }

    #[test]
    fn test_server_flags() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "filecli",
            "-b",
            "127.0.0.1",
            "--directory",
            &dir_arg,
            "-p",
            "HTTP/1.1",
            "9000",
        ])
        .unwrap();

        let config = cli.server.into_config().unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
        assert_eq!(config.root, dir.path());
        assert_eq!(config.protocol, HttpProtocol::Http11);
    }

    #[test]
    fn test_server_conflicting_bind() {
        let cli =
            Cli::try_parse_from(["filecli", "-b", "1.2.3.4", "--bind", "5.6.7.8"]).unwrap();
        let err = cli.server.into_config().unwrap_err();
        assert!(err.to_string().contains("-b and --bind"), "{err}");
    }

    #[test]
    fn test_server_equal_spellings() {
        let cli = Cli::try_parse_from([
            "filecli",
            "-p",
            "HTTP/1.1",
            "--protocol",
            "HTTP/1.1",
        ])
        .unwrap();
        let config = cli.server.into_config().unwrap();
        assert_eq!(config.protocol, HttpProtocol::Http11);
    }

    #[test]
    fn test_server_rejects_bad_protocol() {
        let cli = Cli::try_parse_from(["filecli", "--protocol", "HTTP/2"]).unwrap();
        let err = cli.server.into_config().unwrap_err();
        assert!(err.to_string().contains("Unsupported protocol"), "{err}");
    }

    #[test]
    fn test_server_rejects_bad_port() {
        let err = Cli::try_parse_from(["filecli", "eighty"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_upload_args() {
        let cli = Cli::try_parse_from([
            "filecli", "upload", "-s", "10.0.0.2", "--port", "8000", "-l", "a.txt",
        ])
        .unwrap();

        let Some(Commands::Upload(args)) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(
            args.resolve().unwrap(),
            Transfer {
                server: "10.0.0.2".to_string(),
                port: 8000,
                local: "a.txt".to_string(),
                remote: String::new(),
            }
        );
    }

    #[test]
    fn test_upload_requires_local_file() {
        let cli = Cli::try_parse_from(["filecli", "upload", "-s", "h", "-p", "80"]).unwrap();
        let Some(Commands::Upload(args)) = cli.command else {
            panic!("expected upload");
        };
        assert_eq!(
            args.resolve().unwrap_err().to_string(),
            "Please specify the local file path (-l or --lfile)"
        );
    }

    #[test]
    fn test_download_args() {
        let cli = Cli::try_parse_from([
            "filecli",
            "download",
            "--server",
            "host",
            "-p",
            "8080",
            "-r",
            "/docs/a.txt",
            "--lfile",
            "b.txt",
        ])
        .unwrap();

        let Some(Commands::Download(args)) = cli.command else {
            panic!("expected download");
        };
        let transfer = args.resolve().unwrap();
        assert_eq!(transfer.remote, "/docs/a.txt");
        assert_eq!(transfer.local, "b.txt");
    }

    #[test]
    fn test_download_requires_port() {
        let cli = Cli::try_parse_from(["filecli", "download", "-s", "h", "-r", "a"]).unwrap();
        let Some(Commands::Download(args)) = cli.command else {
            panic!("expected download");
        };
        assert!(matches!(
            args.resolve().unwrap_err(),
            ParamError::Missing { short: 'p', .. }
        ));
    }

    #[test]
    fn test_download_conflicting_port() {
        let cli = Cli::try_parse_from([
            "filecli", "download", "-s", "h", "-p", "80", "--port", "81", "-r", "a",
        ])
        .unwrap();
        let Some(Commands::Download(args)) = cli.command else {
            panic!("expected download");
        };
        assert!(matches!(
            args.resolve().unwrap_err(),
            ParamError::Conflict { .. }
        ));
    }

    #[test]
    fn test_help_and_version() {
        let err = Cli::try_parse_from(["filecli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["filecli", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        let rendered = err.to_string();
        assert!(rendered.contains("Author:"), "{rendered}");
        assert!(rendered.contains("GitHub:"), "{rendered}");
    }
}
