// mac_addr.rs (sysfs first, mac_address crate when sysfs is unavailable)
use std::fs;
use std::io;

pub fn get_mac_addr_for(ifname: &str) -> io::Result<String> {
    match read_sysfs_mac(ifname) {
        Ok(mac) => Ok(mac),
        Err(sysfs_err) => match mac_address::mac_address_by_name(ifname) {
            Ok(Some(mac)) => Ok(mac.to_string().to_ascii_lowercase()),
            // keep the sysfs error, it names the path that was missing
            Ok(None) => Err(sysfs_err),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        },
    }
}

fn read_sysfs_mac(ifname: &str) -> io::Result<String> {
    // an interface name never contains a path separator
    if ifname.is_empty() || ifname.contains('/') {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("bad interface name '{}'", ifname)));
    }
    let p = format!("/sys/class/net/{}/address", ifname);
    let s = fs::read_to_string(&p)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", p, e)))?;
    let mac = s.trim().to_ascii_lowercase();
    if mac.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, format!("{} is empty", p)));
    }
    Ok(mac)
}
