use std::{env, fs, process};
use std::io::Read;
use pkix_codec::crl::{Crl, DumpOptions};


fn main() {
    let mut args = env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            println!("Usage: readcrl <path> [max-entries]");
            return
        }
    };
    let max_entries = match args.next().map(|arg| arg.parse::<usize>()) {
        Some(Ok(max)) => Some(max),
        Some(Err(err)) => {
            eprintln!("Invalid number of entries: {}", err);
            process::exit(1);
        }
        None => None,
    };
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Can’t open file: {}", err);
            process::exit(1);
        }
    };
    let mut data = Vec::new();
    if let Err(err) = file.read_to_end(&mut data) {
        eprintln!("Can’t read file: {}", err);
        process::exit(1);
    }

    let crl = match Crl::decode_any(data.as_ref()) {
        Ok(crl) => crl,
        Err(err) => {
            eprintln!("Can’t decode CRL: {}", err);
            process::exit(1);
        }
    };
    print!("{}", crl.to_dump_string(&DumpOptions::verbose(max_entries)));
}
