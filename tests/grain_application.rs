//! Frame-level grain application properties: determinism, identity,
//! output bounds, and write extent.

use zengrain::{Afgs1Config, IntensityInterval, SeiConfig, Synthesizer, YuvFrame};

fn afgs1_config() -> Afgs1Config {
    let mut cfg = Afgs1Config {
        grain_seed: 0x5a5a,
        grain_scaling: 8,
        ar_coeff_lag: 2,
        ar_coeff_shift: 7,
        grain_scale_shift: 0,
        ..Afgs1Config::default()
    };
    cfg.scaling_points_y
        .try_extend_from_slice(&[[0, 64], [96, 100], [255, 48]])
        .unwrap();
    cfg.scaling_points_cb
        .try_extend_from_slice(&[[0, 32], [255, 32]])
        .unwrap();
    cfg.scaling_points_cr
        .try_extend_from_slice(&[[16, 24], [240, 40]])
        .unwrap();
    cfg.ar_coeffs_y
        .try_extend_from_slice(&[3, -2, 5, 1, -4, 2, 0, 6, -1, 4, -3, 2])
        .unwrap();
    cfg.ar_coeffs_cb
        .try_extend_from_slice(&[1, 2, -1, 0, 3, -2, 1, 0, 2, -1, 1, 0, 20])
        .unwrap();
    cfg.ar_coeffs_cr
        .try_extend_from_slice(&[2, -1, 0, 1, -2, 3, 0, 1, -1, 2, 0, 1, -20])
        .unwrap();
    cfg
}

struct Frame {
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

const WIDTH: usize = 176;
const HEIGHT: usize = 48;
const STRIDE: usize = 192; // extra columns guard the write extent

fn test_frame() -> Frame {
    let fill = |len: usize, salt: usize| {
        (0..len)
            .map(|i| ((i * 11 + salt * 29) % 220 + 18) as u8)
            .collect::<Vec<u8>>()
    };
    Frame {
        y: fill(STRIDE * HEIGHT, 0),
        u: fill(STRIDE / 2 * HEIGHT / 2, 1),
        v: fill(STRIDE / 2 * HEIGHT / 2, 2),
    }
}

fn apply(synth: &mut Synthesizer, frame: &mut Frame) {
    synth.add_grain_frame(&mut YuvFrame {
        y: &mut frame.y,
        u: &mut frame.u,
        v: &mut frame.v,
        width: WIDTH,
        height: HEIGHT,
        y_stride: STRIDE,
        c_stride: STRIDE / 2,
    });
}

#[test]
fn afgs1_frame_is_deterministic() {
    let _ = env_logger::builder().is_test(true).try_init();
    let run = || {
        let mut synth = Synthesizer::new();
        synth.init_afgs1(&afgs1_config()).unwrap();
        let mut frame = test_frame();
        apply(&mut synth, &mut frame);
        frame
    };
    let a = run();
    let b = run();
    assert_eq!(a.y, b.y);
    assert_eq!(a.u, b.u);
    assert_eq!(a.v, b.v);
}

#[test]
fn afgs1_grain_actually_changes_the_frame() {
    let mut synth = Synthesizer::new();
    synth.init_afgs1(&afgs1_config()).unwrap();
    let clean = test_frame();
    let mut grained = test_frame();
    apply(&mut synth, &mut grained);
    assert_ne!(clean.y, grained.y);
    assert_ne!(clean.u, grained.u);
    assert_ne!(clean.v, grained.v);
}

#[test]
fn zero_scale_lut_is_identity() {
    let mut cfg = SeiConfig {
        model_id: 0,
        log2_scale_factor: 5,
        ..SeiConfig::default()
    };
    cfg.components[0].present = true;
    cfg.components[0].intervals.push(IntensityInterval {
        lower_bound: 0,
        upper_bound: 255,
        model_values: [0, 8, 8, 0, 0, 0], // scale 0: patterns built, gain none
    });

    let mut synth = Synthesizer::new();
    synth.init_sei(&cfg).unwrap();
    let clean = test_frame();
    let mut grained = test_frame();
    apply(&mut synth, &mut grained);
    assert_eq!(clean.y, grained.y);
    assert_eq!(clean.u, grained.u);
    assert_eq!(clean.v, grained.v);
}

#[test]
fn writes_stay_inside_the_padded_width() {
    let mut synth = Synthesizer::new();
    synth.init_afgs1(&afgs1_config()).unwrap();
    let clean = test_frame();
    let mut grained = test_frame();
    apply(&mut synth, &mut grained);

    // width 176 is a multiple of 16: nothing past it may change
    for row in 0..HEIGHT {
        assert_eq!(
            &clean.y[row * STRIDE + WIDTH..(row + 1) * STRIDE],
            &grained.y[row * STRIDE + WIDTH..(row + 1) * STRIDE],
            "luma row {row} guard columns written",
        );
    }
    for row in 0..HEIGHT / 2 {
        let cs = STRIDE / 2;
        assert_eq!(
            &clean.u[row * cs + WIDTH / 2..(row + 1) * cs],
            &grained.u[row * cs + WIDTH / 2..(row + 1) * cs],
            "Cb row {row} guard columns written",
        );
    }
}

#[test]
fn legal_range_output_is_clipped() {
    let mut cfg = afgs1_config();
    cfg.clip_to_restricted_range = true;
    // strong grain on extreme inputs
    cfg.scaling_points_y.clear();
    cfg.scaling_points_y
        .try_extend_from_slice(&[[0, 255], [255, 255]])
        .unwrap();

    let mut synth = Synthesizer::new();
    synth.init_afgs1(&cfg).unwrap();

    let mut frame = test_frame();
    frame.y.iter_mut().for_each(|p| *p = if *p % 2 == 0 { 0 } else { 255 });
    apply(&mut synth, &mut frame);

    for row in 0..HEIGHT {
        for &p in &frame.y[row * STRIDE..row * STRIDE + WIDTH] {
            assert!((16..=235).contains(&p), "luma sample {p} outside legal range");
        }
    }
    for row in 0..HEIGHT / 2 {
        for &p in &frame.u[row * STRIDE / 2..row * STRIDE / 2 + WIDTH / 2] {
            assert!((16..=240).contains(&p), "chroma sample {p} outside legal range");
        }
    }
}

#[test]
fn full_range_output_stays_in_depth_bounds() {
    let mut synth = Synthesizer::new();
    synth.set_depth(10);
    synth.set_chroma_subsampling(2, 2);
    synth.init_afgs1(&afgs1_config()).unwrap();

    let mut y: Vec<u16> = (0..STRIDE * HEIGHT).map(|i| (i % 1021) as u16).collect();
    let mut u = vec![500u16; STRIDE / 2 * HEIGHT / 2];
    let mut v = vec![500u16; STRIDE / 2 * HEIGHT / 2];
    synth.add_grain_frame(&mut YuvFrame {
        y: &mut y,
        u: &mut u,
        v: &mut v,
        width: WIDTH,
        height: HEIGHT,
        y_stride: STRIDE,
        c_stride: STRIDE / 2,
    });

    assert!(y.iter().all(|&p| p <= 1020));
    assert!(u.iter().all(|&p| p <= 1020));
    assert!(v.iter().all(|&p| p <= 1020));
}

#[test]
fn sei_frequency_filtering_end_to_end() {
    let mut cfg = SeiConfig {
        model_id: 0,
        log2_scale_factor: 5,
        ..SeiConfig::default()
    };
    cfg.components[0].present = true;
    cfg.components[0].intervals.push(IntensityInterval {
        lower_bound: 0,
        upper_bound: 127,
        model_values: [90, 6, 6, 0, 0, 0],
    });
    cfg.components[0].intervals.push(IntensityInterval {
        lower_bound: 128,
        upper_bound: 255,
        model_values: [60, 12, 10, 0, 0, 0],
    });

    let run = || {
        let mut synth = Synthesizer::new();
        synth.init_sei(&cfg).unwrap();
        synth.set_seed(0xfeed_f00d);
        let mut frame = test_frame();
        apply(&mut synth, &mut frame);
        frame
    };
    let clean = test_frame();
    let a = run();
    assert_ne!(clean.y, a.y);
    // chroma has no model: untouched
    assert_eq!(clean.u, a.u);
    assert_eq!(clean.v, a.v);
    let b = run();
    assert_eq!(a.y, b.y);
}

#[test]
fn sei_auto_regressive_end_to_end() {
    let mut cfg = SeiConfig {
        model_id: 1,
        log2_scale_factor: 6,
        ..SeiConfig::default()
    };
    cfg.components[0].present = true;
    cfg.components[0].intervals.push(IntensityInterval {
        lower_bound: 0,
        upper_bound: 255,
        model_values: [70, 25, 0, -12, 0, 8],
    });

    let mut synth = Synthesizer::new();
    synth.init_sei(&cfg).unwrap();
    synth.set_seed(1);
    let clean = test_frame();
    let mut frame = test_frame();
    apply(&mut synth, &mut frame);
    assert_ne!(clean.y, frame.y);
    assert_eq!(clean.u, frame.u);
}
