//! NonAuth command-line tool
//!
//! Usage: nonauth [OPTIONS]
//!
//! Options:
//!   -g, --generate                          Generate a new configuration
//!   -e, --encode <FILE> <SNI> [ROLE]        Encode a random field
//!   -d, --decode <FILE> <SNI> <HEX> [ROLE]  Decode a random field
//!   -h, --help                              Print help information

use std::env;

use nonauth::{NonAuthConfig, NonAuthConfigFile, Role, Verdict};

fn main() -> anyhow::Result<()> {
    // Initialize tracing — respects RUST_LOG env var (e.g. RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "-h" | "--help" => {
            print_usage();
        }
        "-g" | "--generate" => {
            generate_config()?;
        }
        "-e" | "--encode" => {
            if args.len() < 4 {
                eprintln!("Error: --encode requires a config file path and an SNI");
                return Ok(());
            }
            let role = parse_role(args.get(4))?;
            encode(&args[2], &args[3], role)?;
        }
        "-d" | "--decode" => {
            if args.len() < 5 {
                eprintln!("Error: --decode requires a config file path, an SNI and a hex random");
                return Ok(());
            }
            let role = parse_role(args.get(5))?;
            decode(&args[2], &args[3], &args[4], role)?;
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"NonAuth - covert authentication in TLS hello random fields

USAGE:
    nonauth [OPTIONS]

OPTIONS:
    -g, --generate                          Generate a new configuration
    -e, --encode <FILE> <SNI> [ROLE]        Encode a random field for our hello
    -d, --decode <FILE> <SNI> <HEX> [ROLE]  Inspect the peer's random field
    -h, --help                              Print help information

ROLE is "client" (default) or "server": the side we are playing.

EXAMPLES:
    Generate a shared configuration for both peers:
        nonauth --generate > nonauth.toml

    Produce a ClientHello.Random:
        nonauth --encode nonauth.toml www.example.com client

    Check a ClientHello.Random on the server:
        nonauth --decode nonauth.toml www.example.com <HEX> server
"#
    );
}

fn parse_role(arg: Option<&String>) -> anyhow::Result<Role> {
    match arg.map(String::as_str) {
        None | Some("client") => Ok(Role::Client),
        Some("server") => Ok(Role::Server),
        Some(other) => Err(anyhow::anyhow!("unknown role: {}", other)),
    }
}

fn load_config(path: &str) -> anyhow::Result<NonAuthConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = NonAuthConfigFile::from_toml(&content)?.to_config()?;
    config.validate()?;

    if !config.enabled {
        tracing::warn!("NonAuth is disabled in {}", path);
    }

    Ok(config)
}

fn generate_config() -> anyhow::Result<()> {
    let config = NonAuthConfig::generate()?;
    let config_file = NonAuthConfigFile::from_config(&config);

    println!("# NonAuth Configuration ({})", nonauth::PROTOCOL_DRAFT);
    println!("# Generated: {}", chrono::Utc::now());
    println!("# Share this file with the peer over a trusted channel.");
    println!();
    println!("{}", config_file.to_toml()?);

    Ok(())
}

fn encode(config_path: &str, sni: &str, role: Role) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let random = config.embed(role, sni)?;

    tracing::debug!("Embedded {:?} CAM for SNI {}", role, sni);
    println!("{}", hex::encode(random.as_bytes()));

    Ok(())
}

fn decode(config_path: &str, sni: &str, random_hex: &str, role: Role) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let random = hex::decode(random_hex.trim())?;

    let now = nonauth::covert::unix_now();
    let verdict = match config.inspect_at(&random, sni, now) {
        Ok(verdict) => verdict,
        Err(e) if e.is_replay() => {
            tracing::warn!("Replay window violation: {}", e);
            println!("rejected: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match verdict {
        Verdict::Authenticated(cam) => {
            let expected = config.peer_cam(role);
            println!("authenticated: true");
            println!("cam: {}", hex::encode(cam.as_bytes()));
            println!("peer cam match: {}", cam.ct_eq(expected));
        }
        Verdict::NotAuthenticated => {
            println!("authenticated: false");
        }
    }

    Ok(())
}
