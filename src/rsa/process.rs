use std::thread;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use num_bigint::BigInt;
use crate::rsa::arith::fast_modular_exponent;
use crate::rsa::keys::Key;
use crate::verbose;

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} blocks ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Raises every block to `key.base` mod `key.m` on `threads` workers. Output order equals input order.
pub fn process(blocks: Vec<BigInt>, key: &Key, threads: usize, progress: bool) -> Vec<BigInt> {
    let pb = match progress {
        true => Some(progress_bar(blocks.len())),
        false => None,
    };
    let threads = threads.max(1).min(blocks.len().max(1));
    let res = if threads == 1 {
        blocks.iter()
            .map(|m| {
                let c = fast_modular_exponent(m, &key.base, &key.m);
                if let Some(pb) = &pb { pb.inc(1); }
                c
            })
            .collect::<Vec<_>>()
    } else {
        verbose!("transform {} blocks in {} threads", blocks.len(), threads);
        let chunks = blocks.len();
        let (map_tx, map_rx): (Sender<(usize, BigInt)>, Receiver<(usize, BigInt)>) = bounded(threads);
        let (reduce_tx, reduce_rx): (Sender<(usize, BigInt)>, Receiver<(usize, BigInt)>) = unbounded();
        let handles = (0..threads).map(|_i| {
            let r = map_rx.clone();
            let s = reduce_tx.clone();
            let key = key.clone();
            thread::spawn(move || {
                while let Ok((index, source)) = r.recv() {
                    let res = fast_modular_exponent(&source, &key.base, &key.m);
                    if s.send((index, res)).is_err() { break; }
                }
            })
        }).collect::<Vec<_>>();
        drop(reduce_tx);
        for item in blocks.into_iter().enumerate() {
            if map_tx.send(item).is_err() { break; }
        }
        drop(map_tx);
        let mut res_collect = Vec::with_capacity(chunks);
        while let Ok(r) = reduce_rx.recv() {
            res_collect.push(r);
            if let Some(pb) = &pb { pb.inc(1); }
        }
        for handle in handles {
            // a panicking worker leaves a gap, caught by the length check below
            let _ = handle.join();
        }
        res_collect.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(res_collect.len(), chunks, "worker pool lost blocks");
        res_collect.into_iter().map(|x| x.1).collect::<Vec<_>>()
    };
    if let Some(pb) = &pb {
        pb.finish_with_message("Done");
    }
    res
}
