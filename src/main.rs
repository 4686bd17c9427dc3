fn main() {
    xcookies::init_logging();

    // Contract with the consuming process: stdout carries exactly one JSON
    // line on success, stderr exactly one diagnostic line on failure.
    match xcookies::run() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}
