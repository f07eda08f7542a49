//! Per-vertex transmissibility assembly.
//!
//! Octants around a vertex are indexed by `s = [sx, sy, sz]` with `s[d] = 1`
//! for the cell on the positive side along axis `d`. The twelve sub-faces are
//! indexed `a * 4 + t1 * 2 + t2` where `a` is the face normal and `t1, t2`
//! locate the sub-face along the two cross axes in increasing order.
//!
//! Temperature continuity points sit at the full-face centres of each octant
//! cell, which decouples the one-sided gradient per component:
//! `g_d = -(2 sigma_d / h) (pi_d - T_c)`.

use ndarray::Array2;

use solvers::lu_factorize;

use crate::config::Method;
use crate::materials::SymTensor3;

pub(crate) const SUBFACES: usize = 12;
pub(crate) const OCTANTS: usize = 8;

/// The two axes spanning faces normal to `a`, in increasing order.
#[inline]
pub(crate) fn cross_axes(a: usize) -> (usize, usize) {
    match a {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

#[inline]
pub(crate) fn octant_index(s: [usize; 3]) -> usize {
    s[0] * 4 + s[1] * 2 + s[2]
}

#[inline]
pub(crate) fn subface_index(a: usize, t1: usize, t2: usize) -> usize {
    a * 4 + t1 * 2 + t2
}

/// Sub-face of octant `s` normal to axis `d`.
#[inline]
pub(crate) fn octant_subface(s: [usize; 3], d: usize) -> usize {
    let (c1, c2) = cross_axes(d);
    subface_index(d, s[c1], s[c2])
}

fn is_void(k: &SymTensor3) -> bool {
    k.xx == 0.0
        && k.yy == 0.0
        && k.zz == 0.0
        && k.xy == 0.0
        && k.xz == 0.0
        && k.yz == 0.0
}

/// One-sided flux contributions of the cell in octant `s` to sub-face row
/// `j`: `f = (2/h) sum_d sigma_d K[a][d] (pi_d - T_c)`, flux density taken in
/// the `+a` direction.
fn accumulate(
    x: &mut [[f64; SUBFACES]; SUBFACES],
    y: &mut [[f64; OCTANTS]; SUBFACES],
    j: usize,
    a: usize,
    s: [usize; 3],
    k: &SymTensor3,
    h: f64,
) {
    let oct = octant_index(s);
    for d in 0..3 {
        let sigma = 2.0 * s[d] as f64 - 1.0;
        let coef = (2.0 / h) * sigma * k.component(a, d);
        x[j][octant_subface(s, d)] += coef;
        y[j][oct] -= coef;
    }
}

/// Flux matrix `E` (12 sub-faces by 8 octant cells) for one vertex, flattened
/// row-major. `E . T8` gives the sub-face flux densities in the positive axis
/// direction. Returns `None` when the continuity system is singular.
pub(crate) fn vertex_matrix(
    k8: &[SymTensor3; OCTANTS],
    h: f64,
    method: Method,
) -> Option<[f64; SUBFACES * OCTANTS]> {
    let mut xm = [[0.0f64; SUBFACES]; SUBFACES];
    let mut xp = [[0.0f64; SUBFACES]; SUBFACES];
    let mut ym = [[0.0f64; OCTANTS]; SUBFACES];
    let mut yp = [[0.0f64; OCTANTS]; SUBFACES];
    let mut void_face = [false; SUBFACES];

    for a in 0..3 {
        let (c1, c2) = cross_axes(a);
        for t1 in 0..2 {
            for t2 in 0..2 {
                let j = subface_index(a, t1, t2);
                let mut s_m = [0usize; 3];
                s_m[c1] = t1;
                s_m[c2] = t2;
                let mut s_p = s_m;
                s_p[a] = 1;
                let km = &k8[octant_index(s_m)];
                let kp = &k8[octant_index(s_p)];
                if is_void(km) && is_void(kp) {
                    void_face[j] = true;
                    continue;
                }
                accumulate(&mut xm, &mut ym, j, a, s_m, km, h);
                accumulate(&mut xp, &mut yp, j, a, s_p, kp, h);
            }
        }
    }

    // Flux continuity X- pi + Y- T = X+ pi + Y+ T, so C pi = D T with
    // C = X- - X+ and D = Y+ - Y-. Sub-faces between two voids carry no
    // flux; their rows get an identity placeholder.
    let mut c = Array2::zeros((SUBFACES, SUBFACES));
    let mut d_mat = Array2::zeros((SUBFACES, OCTANTS));
    for j in 0..SUBFACES {
        if void_face[j] {
            c[[j, j]] = 1.0;
            continue;
        }
        for col in 0..SUBFACES {
            c[[j, col]] = xm[j][col] - xp[j][col];
        }
        for col in 0..OCTANTS {
            d_mat[[j, col]] = yp[j][col] - ym[j][col];
        }
    }

    let lu = lu_factorize(&c).ok()?;
    let w = lu.solve_matrix(&d_mat).ok()?;

    let mut e = [0.0f64; SUBFACES * OCTANTS];
    for j in 0..SUBFACES {
        for oct in 0..OCTANTS {
            let v = match method {
                Method::Mpfa => {
                    let mut v = ym[j][oct];
                    for m in 0..SUBFACES {
                        v += xm[j][m] * w[[m, oct]];
                    }
                    v
                }
                Method::Empfa => {
                    let mut v = 0.5 * (ym[j][oct] + yp[j][oct]);
                    for m in 0..SUBFACES {
                        v += 0.5 * (xm[j][m] + xp[j][m]) * w[[m, oct]];
                    }
                    v
                }
            };
            e[j * OCTANTS + oct] = v;
        }
    }
    Some(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn minus_plus_octants(a: usize, t1: usize, t2: usize) -> (usize, usize) {
        let (c1, c2) = cross_axes(a);
        let mut s = [0usize; 3];
        s[c1] = t1;
        s[c2] = t2;
        let m = octant_index(s);
        s[a] = 1;
        (m, octant_index(s))
    }

    #[test]
    fn uniform_isotropic_collapses_to_two_point_flux() {
        let k8 = [SymTensor3::isotropic(3.0); OCTANTS];
        let h = 0.5;
        for method in [Method::Mpfa, Method::Empfa] {
            let e = vertex_matrix(&k8, h, method).unwrap();
            for a in 0..3 {
                for t1 in 0..2 {
                    for t2 in 0..2 {
                        let j = subface_index(a, t1, t2);
                        let (m, p) = minus_plus_octants(a, t1, t2);
                        for oct in 0..OCTANTS {
                            let expected = if oct == m {
                                3.0 / h
                            } else if oct == p {
                                -3.0 / h
                            } else {
                                0.0
                            };
                            assert_abs_diff_eq!(e[j * OCTANTS + oct], expected, epsilon = 1e-12);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn diagonal_tensors_reduce_to_harmonic_two_point_flux() {
        // two media split across the x = 0 plane, diagonal tensors
        let ka = SymTensor3::from_components([2.0, 5.0, 7.0, 0.0, 0.0, 0.0]);
        let kb = SymTensor3::from_components([6.0, 1.0, 3.0, 0.0, 0.0, 0.0]);
        let mut k8 = [ka; OCTANTS];
        for s1 in 0..2 {
            for s2 in 0..2 {
                k8[octant_index([1, s1, s2])] = kb;
            }
        }
        let e = vertex_matrix(&k8, 1.0, Method::Mpfa).unwrap();
        // sub-faces normal to x see the harmonic mean of 2 and 6
        let kh = 2.0 * 2.0 * 6.0 / (2.0 + 6.0);
        for t1 in 0..2 {
            for t2 in 0..2 {
                let j = subface_index(0, t1, t2);
                let (m, p) = minus_plus_octants(0, t1, t2);
                assert_abs_diff_eq!(e[j * OCTANTS + m], kh, epsilon = 1e-12);
                assert_abs_diff_eq!(e[j * OCTANTS + p], -kh, epsilon = 1e-12);
            }
        }
        // sub-faces normal to y inside medium a keep its yy component
        let j = subface_index(1, 0, 0);
        let (m, p) = minus_plus_octants(1, 0, 0);
        assert_abs_diff_eq!(e[j * OCTANTS + m], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e[j * OCTANTS + p], -5.0, epsilon = 1e-12);
    }

    #[test]
    fn all_void_vertex_yields_zero_fluxes() {
        let k8 = [SymTensor3::isotropic(0.0); OCTANTS];
        let e = vertex_matrix(&k8, 1.0, Method::Mpfa).unwrap();
        for v in e {
            assert_eq!(v, 0.0);
        }
    }
}
