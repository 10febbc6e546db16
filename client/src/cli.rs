use std::{fs::File, io::BufReader, path::PathBuf};
use clap::{value_parser, Arg, ArgAction, Command};
use gearpaint::{config::ConfigManager, gearfile::{stain, Mtrl, StainingTemplateFile, TemplateType}, json_pretty, StainingCache, StmBytes, StmDirectory, StmSource};

pub fn handle_cli() -> Result<(), Box<dyn std::error::Error>> {
	let matches = Command::new("gearpaint")
		.about("Final Fantasy XIV material and dye inspector")
		.version("1.0")
		.subcommand_required(true)
		.arg(Arg::new("verbose")
			.short('v')
			.long("verbose")
			.help("Log debug output")
			.global(true)
			.action(ArgAction::SetTrue))
		
		.subcommand(Command::new("mtrl")
			.about("Print a decoded material as json")
			.arg(Arg::new("path")
				.help("Path of the .mtrl file")
				.required(true)
				.value_parser(value_parser!(PathBuf))
				.action(ArgAction::Set)
				.num_args(1)))
		
		.subcommand(Command::new("stm")
			.about("Inspect a staining template file")
			.arg(Arg::new("path")
				.help("Path of the .dyes file")
				.required(true)
				.value_parser(value_parser!(PathBuf))
				.action(ArgAction::Set)
				.num_args(1))
			.arg(Arg::new("type")
				.long("type")
				.help("Which templates the file holds")
				.value_parser(["endwalker", "dawntrail"])
				.default_value("dawntrail")
				.action(ArgAction::Set)
				.num_args(1))
			.arg(Arg::new("template")
				.long("template")
				.help("Print the values of this template instead of a summary")
				.value_parser(value_parser!(u32))
				.action(ArgAction::Set)
				.num_args(1))
			.arg(Arg::new("dye")
				.long("dye")
				.help("Dye to print the template values of")
				.requires("template")
				.value_parser(value_parser!(u32))
				.action(ArgAction::Set)
				.num_args(1)))
		
		.subcommand(Command::new("ramps")
			.about("Print the color ramps of a material as json")
			.arg(Arg::new("path")
				.help("Path of the .mtrl file")
				.required(true)
				.value_parser(value_parser!(PathBuf))
				.action(ArgAction::Set)
				.num_args(1))
			.arg(dye_arg("dye1", "Dye of channel 1, defaults to the configured one"))
			.arg(dye_arg("dye2", "Dye of channel 2, defaults to the configured one"))
			.arg(stm_dir_arg()))
		
		.subcommand(Command::new("dyes")
			.about("List all dyes"))
		
		.subcommand(Command::new("config")
			.about("Show or change the config")
			.arg(dye_arg("dye1", "Default dye of channel 1"))
			.arg(dye_arg("dye2", "Default dye of channel 2"))
			.arg(stm_dir_arg()))
		
		.get_matches();
	
	if matches.get_flag("verbose") {
		log::set_max_level(log::LevelFilter::Debug);
	}
	
	match matches.subcommand() {
		Some(("mtrl", sub)) => {
			let path = sub.get_one::<PathBuf>("path").ok_or("path is required")?;
			let mtrl = Mtrl::read(&mut BufReader::new(File::open(path)?))?;
			println!("{}", json_pretty(&mtrl)?);
		}
		
		Some(("stm", sub)) => {
			let path = sub.get_one::<PathBuf>("path").ok_or("path is required")?;
			let template_type = match sub.get_one::<String>("type").map(|v| v.as_str()) {
				Some("endwalker") => TemplateType::Endwalker,
				_ => TemplateType::Dawntrail,
			};
			let data = std::fs::read(path)?;
			
			match sub.get_one::<u32>("template") {
				Some(template) => {
					let dye = sub.get_one::<u32>("dye").copied().unwrap_or(0);
					let mut cache = StainingCache::new(StmBytes::new().with(template_type, data));
					println!("{}", json_pretty(cache.template_values(template_type, *template, dye)?)?);
				}
				
				None => {
					let file = StainingTemplateFile::read(&data, template_type)?;
					println!("{}", json_pretty(&serde_json::json!({
						"type": file.template_type,
						"format": file.format,
						"dyes": file.format.dye_count(),
						"properties": file.property_names(),
						"templates": file.templates.keys().collect::<Vec<_>>(),
					}))?);
				}
			}
		}
		
		Some(("ramps", sub)) => {
			let path = sub.get_one::<PathBuf>("path").ok_or("path is required")?;
			let config = ConfigManager::load(&config_path()?).config;
			let mut dyes = config.active_dyes();
			if let Some(dye) = sub.get_one::<u32>("dye1") {
				dyes.channel_1 = *dye;
			}
			if let Some(dye) = sub.get_one::<u32>("dye2") {
				dyes.channel_2 = *dye;
			}
			
			let mtrl = Mtrl::read(&mut BufReader::new(File::open(path)?))?;
			let template_type = gearpaint::template_type_for(&mtrl, &config.legacy_shader);
			let ramps = match sub.get_one::<PathBuf>("stm-dir").or(config.stm_directory.as_ref()) {
				Some(dir) => ramps(&mtrl, template_type, dyes, StmDirectory::new(dir), &config.ramp_positions),
				None => {
					log::warn!("No staining template directory set, dyes are ignored");
					ramps(&mtrl, template_type, dyes, StmBytes::new(), &config.ramp_positions)
				}
			};
			
			println!("{}", json_pretty(&serde_json::json!({
				"template_type": template_type,
				"dyes": dyes,
				"ramps": ramps,
			}))?);
		}
		
		Some(("dyes", _)) => {
			for (id, name) in stain::dyes() {
				println!("{id:>3} {name}");
			}
		}
		
		Some(("config", sub)) => {
			let mut manager = ConfigManager::load(&config_path()?);
			manager.mark_for_changes();
			if let Some(dye) = sub.get_one::<u32>("dye1") {
				manager.config.dye_1 = *dye;
			}
			if let Some(dye) = sub.get_one::<u32>("dye2") {
				manager.config.dye_2 = *dye;
			}
			if let Some(dir) = sub.get_one::<PathBuf>("stm-dir") {
				manager.config.stm_directory = Some(dir.to_owned());
			}
			manager.save()?;
			
			println!("{:?}\n{}", manager.path(), json_pretty(&manager.config)?);
		}
		
		_ => unreachable!()
	}
	
	Ok(())
}

fn ramps<S: StmSource>(mtrl: &Mtrl, template_type: TemplateType, dyes: gearpaint::ActiveDyes, source: S, positions: &[f64]) -> Vec<gearpaint::Ramp> {
	gearpaint::build_ramps(mtrl, template_type, dyes, &mut StainingCache::new(source), positions)
}

fn config_path() -> Result<PathBuf, &'static str> {
	gearpaint::default_config_path().ok_or("Unable to find the config directory")
}

fn dye_arg(name: &'static str, help: &'static str) -> Arg {
	Arg::new(name)
		.long(name)
		.help(help)
		.value_parser(value_parser!(u32).range(0..=254))
		.action(ArgAction::Set)
		.num_args(1)
}

fn stm_dir_arg() -> Arg {
	Arg::new("stm-dir")
		.long("stm-dir")
		.help("Directory containing bucket_of_paint.dyes and bucket_of_newer_paint.dyes")
		.value_parser(value_parser!(PathBuf))
		.action(ArgAction::Set)
		.num_args(1)
}
