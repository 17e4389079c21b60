//! Synapse CLI - dispatch requests into the sync engine
//!
//! Commands:
//!   synapse serve [--addr 127.0.0.1:4000] [--app <name>]
//!   synapse request <path> [json-body]     One-shot dispatch, print response
//!   synapse trace <path> [json-body]       One-shot dispatch, print the chain
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::net::SocketAddr;
use synapse::concepts::requesting;
use synapse::logging::init_logging;
use synapse::node::{Node, NodeConfig};

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }
    if opts.version {
        println!("synapse {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("serve") => cmd_serve(&opts),
        Some("request") => cmd_request(&opts, false),
        Some("trace") => cmd_request(&opts, true),
        Some(cmd) => Err(format!("Unknown command: {cmd}")),
        None => {
            print_usage();
            return;
        }
    };

    match result {
        Ok(output) => {
            if opts.pretty || std::io::stdout().is_terminal() {
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                println!("{}", serde_json::to_string(&output).unwrap());
            }
        }
        Err(message) => {
            let err = json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap());
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    addr: Option<String>,
    app: Option<String>,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut iter = args.iter().peekable();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--addr" => opts.addr = iter.next().cloned(),
                "--app" => opts.app = iter.next().cloned(),
                "--pretty" => opts.pretty = true,
                "--json" => opts.pretty = false,
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                _ if opts.command.is_none() => opts.command = Some(arg.clone()),
                _ => opts.positional.push(arg.clone()),
            }
        }
        opts
    }

    fn node(&self) -> Result<Node, String> {
        let app = self.app.clone().unwrap_or_else(|| "synapse".to_string());
        Node::new(NodeConfig::new(app)).map_err(|e| e.to_string())
    }
}

fn cmd_serve(opts: &ParsedArgs) -> Result<Value, String> {
    let addr: SocketAddr = opts
        .addr
        .as_deref()
        .unwrap_or("127.0.0.1:4000")
        .parse()
        .map_err(|e| format!("invalid --addr: {e}"))?;
    let node = std::sync::Arc::new(opts.node()?);

    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime
        .block_on(synapse::server::serve(node, addr))
        .map_err(|e| e.to_string())?;
    Ok(json!({"message": "shutdown"}))
}

fn cmd_request(opts: &ParsedArgs, trace: bool) -> Result<Value, String> {
    let path = opts.positional.first().ok_or("Usage: synapse request <path> [json-body]")?;
    let body: Value = match opts.positional.get(1) {
        Some(raw) => serde_json::from_str(raw).map_err(|e| format!("invalid body: {e}"))?,
        None => json!({}),
    };

    let node = opts.node()?;
    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime.block_on(async {
        if trace {
            let Value::Object(fields) = body else {
                return Err("request body must be a JSON object".to_string());
            };
            let mut input: synapse::Payload = fields.into_iter().collect();
            input.insert("path".to_string(), json!(path));
            let chain = node
                .engine()
                .dispatch(requesting::request(), input)
                .await
                .map_err(|e| e.to_string())?;
            let records: Vec<Value> = chain.records().iter().map(|r| r.to_value()).collect();
            Ok(json!({"chain": chain.id(), "records": records}))
        } else {
            node.handle(path, body).await.map_err(|e| e.to_string())
        }
    })
}

fn print_usage() {
    println!(
        r#"synapse - concept synchronization engine

USAGE:
    synapse serve [--addr 127.0.0.1:4000] [--app <name>]
    synapse request <path> [json-body]
    synapse trace <path> [json-body]

OPTIONS:
    --pretty     Pretty-print JSON output
    --json       Raw JSON output
    -h, --help
    -V, --version

EXAMPLES:
    synapse request /Profile/createAccount '{{"username":"alice","password":"p"}}'
    synapse trace /auth/login '{{"username":"alice","password":"p"}}'
"#
    );
}
