pub mod p001_energy_consumption;
