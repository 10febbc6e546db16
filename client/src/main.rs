mod cli;

struct SimpleLogger;

impl log::Log for SimpleLogger {
	fn enabled(&self, metadata: &log::Metadata) -> bool {
		match metadata.target().split("::").next() {
			Some("gearfile") |
			Some("gearpaint") |
			Some("gearpaint_cli") => true,
			_ => false,
		}
	}
	
	fn log(&self, record: &log::Record) {
		if !self.enabled(record.metadata()) {return}
		
		let level = match record.level() {
			log::Level::Error => "ERROR",
			log::Level::Warn => "WARN",
			log::Level::Info => "LOG",
			log::Level::Debug => "DEBUG",
			log::Level::Trace => "TRACE",
		};
		
		let msg = record.args().to_string();
		
		// stdout is reserved for json output
		eprintln!("[{level}] {msg}");
	}
	
	fn flush(&self) {
	
	}
}

fn main() {
	_ = log::set_boxed_logger(Box::new(SimpleLogger));
	log::set_max_level(log::LevelFilter::Warn);
	
	if let Err(err) = cli::handle_cli() {
		eprintln!("{err}");
		std::process::exit(1);
	}
}
