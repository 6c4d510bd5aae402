mod hickory_dnsbl_prober;

pub use hickory_dnsbl_prober::HickoryDnsblProber;
