use std::fmt::Write as _;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// MD log with header noise, a 6-field thermo block, 7-field per-species
/// lines and a 10-field summary block.
fn md_log(rng: &mut SimpleRng) -> String {
    let mut out = String::new();
    out.push_str("LAMMPS (sample)\n");
    out.push_str("units real\natom_style full\n");
    out.push_str("# Step Temp PotEng KinEng Press Volume\n");

    for step in 0..200 {
        let temp = rng.gauss(300.0, 4.0);
        let pot = rng.gauss(-12500.0, 35.0);
        let kin = 1.5 * 0.0019872041 * temp * 1000.0;
        let press = rng.gauss(1.0, 250.0);
        let vol = rng.gauss(27000.0, 40.0);
        let _ = writeln!(out, "{:>8} {temp:.4} {pot:.4} {kin:.4} {press:.4} {vol:.4}", step * 100);

        if step % 50 == 0 {
            for species in ["Li", "Na", "K"] {
                let _ = writeln!(
                    out,
                    "species {species} {} {:.5} {:.5} {:.5} {:.5}",
                    step * 100,
                    rng.gauss(0.5, 0.05),
                    rng.gauss(1.2, 0.1),
                    rng.gauss(-3.0, 0.2),
                    rng.gauss(0.0, 0.01),
                );
            }
        }
    }

    out.push_str("Loop time of 123.4 on 16 procs for 20000 steps with 3000 atoms\n");
    for section in ["Pair", "Bond", "Kspace", "Neigh", "Comm"] {
        let min = rng.next_f64() * 10.0;
        let avg = min + rng.next_f64();
        let max = avg + rng.next_f64();
        let _ = writeln!(
            out,
            "{section} | {min:.3} | {avg:.3} | {max:.3} | {:.1} {:.2}",
            rng.next_f64() * 40.0,
            rng.next_f64() * 100.0
        );
    }
    out
}

/// Phonon frequencies (cm⁻¹) of five cell volumes, one k-point per line,
/// labelled by mode number; a few imaginary modes printed as negatives.
fn frequency_table(rng: &mut SimpleRng) -> String {
    let mut out = String::new();
    out.push_str("# mode  V1  V2  V3  V4  V5   (cm-1)\n");
    for mode in 1..=60 {
        let base = 40.0 + mode as f64 * 55.0;
        let _ = write!(out, "MODE{mode:03}");
        for v in 0..5 {
            // softer modes at larger volume
            let freq = base * (1.0 - 0.015 * v as f64) + rng.gauss(0.0, 2.0);
            let _ = write!(out, " {freq:10.4}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "MODE061 {:10.4} {:10.4} {:10.4} {:10.4} {:10.4}", 12.0, 8.5, 3.1, -4.2, -9.7);
    out
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let log_path = "sample_md.log";
    std::fs::write(log_path, md_log(&mut rng)).with_context(|| format!("writing {log_path}"))?;

    let freq_path = "sample_freq.dat";
    std::fs::write(freq_path, frequency_table(&mut rng))
        .with_context(|| format!("writing {freq_path}"))?;

    println!("Wrote {log_path} and {freq_path}");
    println!("  simtab {log_path} --fields 6 --column 2,3 --stat mean,stdev");
    println!("  simtab {freq_path} --comment '#' --column 2 --frequency-unit cm1 --stat zpe");
    Ok(())
}
