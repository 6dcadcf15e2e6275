//! Benchmarks for the pagination core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pageflow::layout::{
    measure_content_height, BreakBoundary, ContentHeight, EstimateInput, PageCountEstimator, RenderedNode,
};
use pageflow::session::{RenderSnapshot, RenderSurface};
use pageflow::{
    build_decorations, BandText, DecorationSet, EstimateStrategy, PageConfig, PageGeometry, PageHeightCache,
    PaginationSession, PaginationTuning, QueuedScheduler,
};

fn estimate_input(height: f32, rendered_pages: usize) -> EstimateInput {
    let geometry = PageGeometry::compute(&PageConfig::default(), 0.0, 0.0);
    EstimateInput {
        content: ContentHeight::Measured(height),
        geometry,
        page_gap: 50.0,
        rendered_pages,
        boundary: Some(BreakBoundary {
            content_bottom: height,
            break_bottom: rendered_pages as f32 * geometry.page_span(50.0) - 50.0,
        }),
    }
}

fn bench_estimate(c: &mut Criterion) {
    let division = PageCountEstimator::new(&PaginationTuning {
        strategy: EstimateStrategy::Division,
        ..PaginationTuning::default()
    });
    let overflow = PageCountEstimator::new(&PaginationTuning::default());
    let input = estimate_input(84_000.0, 90);

    c.bench_function("estimate_division", |b| {
        b.iter(|| division.estimate(black_box(&input)));
    });
    c.bench_function("estimate_overflow_correction", |b| {
        b.iter(|| overflow.estimate(black_box(&input)));
    });
}

fn bench_measure(c: &mut Criterion) {
    let tuning = PaginationTuning::default();
    let mut nodes: Vec<RenderedNode> = (0..2000).map(|i| RenderedNode::block(i as f32 * 40.0, 40.0)).collect();
    // Scaffolding interleaved the way page breaks land between blocks
    for i in (0..2000).step_by(25) {
        nodes.insert(i, RenderedNode::scaffold(i as f32 * 40.0, 150.0));
    }

    c.bench_function("measure_2000_blocks", |b| {
        b.iter(|| measure_content_height(black_box(&nodes), &tuning));
    });
}

fn bench_build_decorations(c: &mut Criterion) {
    let config = PageConfig {
        header: BandText::new("Pageflow", "", "{page} / {total}"),
        ..PageConfig::default()
    };
    let heights = PageHeightCache::new();

    c.bench_function("build_decorations_10_pages", |b| {
        b.iter(|| build_decorations(&config, &heights, black_box(10), 300));
    });
    c.bench_function("build_decorations_300_pages", |b| {
        b.iter(|| build_decorations(&config, &heights, black_box(300), 300));
    });
}

struct FixedHost {
    height: f32,
    rendered: DecorationSet,
}

impl RenderSurface for FixedHost {
    fn snapshot(&self) -> RenderSnapshot {
        let break_bottom = self
            .rendered
            .pages
            .iter()
            .map(|p| p.content_area_height + if p.is_last_page { 0.0 } else { p.gap.height })
            .sum::<f32>();
        RenderSnapshot {
            nodes: vec![RenderedNode::block(0.0, self.height)],
            rendered_pages: Some(self.rendered.total_pages),
            last_break_bottom: Some(break_bottom),
            decoration_version: Some(self.rendered.version),
            bands: Vec::new(),
        }
    }
}

fn bench_convergence(c: &mut Criterion) {
    c.bench_function("converge_40_pages", |b| {
        b.iter(|| {
            let mut session =
                PaginationSession::new(PageConfig::default(), PaginationTuning::default(), QueuedScheduler::new())
                    .unwrap();
            let mut host = FixedHost {
                height: black_box(33_000.0),
                rendered: session.decorations().clone(),
            };
            let mut now = 0;
            session.on_post_render(&host, now);

            while let Some(pass) = session.scheduler_mut().take() {
                now += pass.delay_ms.unwrap_or(16);
                if let Some(update) = session.run_deferred(pass.ticket, &host, now) {
                    host.rendered = update.decorations;
                    session.on_post_render(&host, now);
                }
            }
            session.page_count()
        });
    });
}

criterion_group!(
    benches,
    bench_estimate,
    bench_measure,
    bench_build_decorations,
    bench_convergence,
);
criterion_main!(benches);
