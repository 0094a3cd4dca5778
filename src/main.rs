use std::process::exit;

fn main() {
    match warden::run() {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    }
}
