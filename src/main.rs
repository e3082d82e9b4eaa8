#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]

mod macros;

use star_usbid::{
    select::{self, Event, IdSource, Plan, Summary},
    usb::RusbHost,
    DeviceRegistry, Programmer, UsbPath,
};

/// USB-ID programmer for Star Micronics receipt printers.
#[derive(argh::FromArgs)]
struct Arguments {
    /// the USB-ID to set: up to 8 digits or capital letters.
    #[argh(option, default = "String::from(\"AB123456\")")]
    usb_id: String,

    /// set a random USB-ID on every printer.
    #[argh(switch, short = 'r')]
    random: bool,

    /// show what would be done without writing to any printer.
    #[argh(switch, short = 's')]
    simulate: bool,

    /// only list the Star printers found.
    #[argh(switch, short = 'l')]
    list: bool,

    /// address of the target printer on its USB bus.
    #[argh(option)]
    address: Option<u8>,
    /// bus number of the target printer.
    #[argh(option)]
    bus: Option<u8>,
    /// port number of the target printer.
    #[argh(option)]
    port: Option<u8>,

    /// print a reboot message on the printer after programming.
    #[argh(switch)]
    print_reboot: bool,

    /// give every printer without a USB-ID a random one and print a reboot message.
    #[argh(switch)]
    all_unset: bool,

    /// print debug logs.
    #[argh(switch, short = 'd')]
    debug: bool,
}

impl Arguments {
    /// The target selected with `--bus`, `--address` and `--port`.
    fn target(&self) -> Result<Option<UsbPath>, &'static str> {
        match (self.bus, self.address, self.port) {
            (Some(bus), Some(address), Some(port)) => Ok(Some(UsbPath::new(bus, address, port))),
            (None, None, None) => Ok(None),
            _ => Err("--address, --bus and --port must be given together"),
        }
    }

    /// Rejects combinations that would write to more printers than asked for.
    fn check(&self) -> Result<(), &'static str> {
        let target = self.target()?;
        if self.all_unset && (self.list || target.is_some()) {
            return Err("--all-unset cannot be combined with --list or a target");
        }
        Ok(())
    }

    fn plan(&self) -> Plan {
        Plan {
            id: if self.random {
                IdSource::Random
            } else {
                IdSource::Explicit(self.usb_id.clone())
            },
            list_only: self.list,
            simulate: self.simulate,
            target: self.target().ok().flatten(),
            reboot_prompt: self.print_reboot,
        }
    }
}

fn main() {
    let args = argh::from_env::<Arguments>();
    init_logger(args.debug);

    info!("star-usbid", "v{}", env!("CARGO_PKG_VERSION"));
    if let Err(msg) = args.check() {
        error!("Refusing", "{}", msg);
        std::process::exit(2);
    }

    info!("Scanning", "the USB bus for Star devices...");
    let registry = match DeviceRegistry::discover(&RusbHost) {
        Ok(registry) => registry,
        Err(err) => {
            error!("Failed", "{}", err);
            std::process::exit(1);
        }
    };

    let mut programmer = Programmer::new(RusbHost);
    let mut rng = rand::rng();

    if args.all_unset {
        let result =
            select::set_random_for_unset(&mut programmer, &registry, args.simulate, &mut rng, report);
        match result {
            Ok(_) if args.simulate => {}
            Ok(count) => {
                ok!("Programmed", "{} printer(s) without a USB-ID", count);
            }
            Err(err) => {
                error!("Failed", "{}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    let plan = args.plan();
    let summary = select::run(&mut programmer, &registry, &plan, &mut rng, report);
    print_summary(&plan, summary);

    if summary.failed > 0 {
        std::process::exit(1);
    }
}

fn init_logger(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn report(event: Event<'_>) {
    match event {
        Event::NoDevices => {
            info!("Found", "no Star devices");
        }
        Event::Found(count) => {
            ok!("Found", "{} Star device(s)", count);
        }
        Event::Device { index, device } => {
            let usb_id = if device.has_serial_number() {
                format!("[{}]", device.serial_number)
            } else {
                "not set".to_owned()
            };
            info!(
                &format!("[{}]", index),
                "{} address:{} bus:{} port:{} USB-ID: {}",
                device.product_name,
                device.path.address,
                device.path.bus,
                device.path.port,
                usb_id
            );
        }
        Event::RandomId => {
            info!("Generating", "a random USB-ID");
        }
        Event::Setting { index, id } => {
            info!("Setting", "USB-ID of [{}] to [{}]", index, id);
        }
        Event::WouldProgram { index, id } => {
            info!("Simulating", "would write [{}] to [{}]", id, index);
        }
        Event::NotTargeted { index } => {
            info!("Skipping", "[{}]: not the target", index);
        }
        Event::RebootPrompt { index, id } => {
            warning!("Printing", "reboot message with USB-ID [{}] on [{}]", id, index);
        }
        Event::Programmed { index, id } => {
            ok!("Programmed", "[{}] with USB-ID [{}]", index, id);
        }
        Event::Failed { index, error } if error.is_already_set() => {
            info!("Skipping", "[{}]: {}", index, error);
        }
        Event::Failed { index, error } => {
            error!("Failed", "to set USB-ID for [{}]: {}", index, error);
        }
    }
}

fn print_summary(plan: &Plan, summary: Summary) {
    if summary.programmed > 0 {
        info!("Reboot", "the printer(s) for the change to take effect.");
        info!("Note", "rebooting a printer might change its USB address.");
    }
    if plan.list_only || plan.simulate {
        return;
    }
    info!(
        "Done",
        "{} programmed, {} skipped, {} failed",
        summary.programmed,
        summary.skipped,
        summary.failed
    );
}
