fn main() {
    if let Err(err) = workflow_viz::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
