//! Send a push from the command line.
//!
//! Run with: `cargo run --example send_push -- <device-key> <title> <body> [server]`

use barkpush::{PushClient, PushOptions};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: send_push <device-key> <title> <body> [server]");
        std::process::exit(2);
    }

    let mut client = match PushClient::new([args[0].as_str()], args.get(3).map(String::as_str)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("init: {}", e);
            std::process::exit(1);
        }
    };

    let options = PushOptions::new().group("barkpush");
    match client.send_advanced(&args[1], &args[2], &options) {
        Ok(resp) => println!("sent ({}): {}", resp.status, resp.body),
        Err(e) => {
            eprintln!("{:?}: {}", e.kind(), e);
            std::process::exit(1);
        }
    }

    barkpush::transport::shutdown();
}
