use crate::core::types::{DocCount, TermCount};
use crate::matcher::stats::CollectionStats;

/// Weighting scheme contribution of one term (or synonym group).
///
/// A `Weight` is primed once from the collection statistics; scoring then
/// only needs the per-document wdf and document length.
pub trait Weight: Send + Sync {
    fn score(&self, wdf: TermCount, doc_len: TermCount) -> f64;

    /// Upper bound on `score` over any document.
    fn max_score(&self) -> f64;

    fn name(&self) -> &str;
}

/// BM25 weighting
pub struct Bm25Weight {
    pub k1: f64,  // Term frequency saturation (default: 1.2)
    pub b: f64,   // Length normalization strength (default: 0.75)
    idf: f64,
    average_length: f64,
    wdf_upper: TermCount,
    doc_length_lower: TermCount,
    multiplier: f64,
}

impl Bm25Weight {
    pub fn new(stats: &CollectionStats, term: &str, wqf: TermCount, factor: f64) -> Self {
        Self::with_parameters(1.2, 0.75, stats, term, wqf, factor)
    }

    pub fn with_parameters(
        k1: f64,
        b: f64,
        stats: &CollectionStats,
        term: &str,
        wqf: TermCount,
        factor: f64,
    ) -> Self {
        let collection_size = stats.collection_size as f64;
        let termfreq = stats.get_termfreq(term) as f64;
        let rset_size = stats.rset_size as f64;
        let reltermfreq = stats.get_reltermfreq(term) as f64;

        // Robertson/Sparck-Jones idf; collapses to the plain form when no
        // relevance information was supplied.
        let idf = if stats.rset_size > 0 {
            (((reltermfreq + 0.5) * (collection_size - termfreq - rset_size + reltermfreq + 0.5))
                / ((termfreq - reltermfreq + 0.5) * (rset_size - reltermfreq + 0.5)))
                .ln()
        } else {
            ((collection_size + 1.0) / (termfreq + 1.0)).ln()
        };

        let (wdf_upper, doc_length_lower) = match stats.database() {
            Some(db) => (db.wdf_upper_bound(term), db.doc_length_lower_bound()),
            None => (1, 1),
        };

        Bm25Weight {
            k1,
            b,
            idf: idf.max(0.0),
            average_length: stats.average_length().max(1.0),
            wdf_upper,
            doc_length_lower,
            multiplier: wqf as f64 * factor,
        }
    }

    /// Weight for a synonym group scored as a single pseudo-term with the
    /// given estimated document frequency. The group's summed wdf is only
    /// bounded by the document length, so that bound stands in for the
    /// per-term wdf bound.
    pub fn for_group(stats: &CollectionStats, termfreq: DocCount, factor: f64) -> Self {
        let collection_size = stats.collection_size as f64;
        let idf = ((collection_size + 1.0) / (termfreq as f64 + 1.0)).ln();

        let (wdf_upper, doc_length_lower) = match stats.database() {
            Some(db) => (db.doc_length_upper_bound(), db.doc_length_lower_bound()),
            None => (1, 1),
        };

        Bm25Weight {
            k1: 1.2,
            b: 0.75,
            idf: idf.max(0.0),
            average_length: stats.average_length().max(1.0),
            wdf_upper,
            doc_length_lower,
            multiplier: factor,
        }
    }

    fn bm25(&self, wdf: TermCount, doc_len: TermCount) -> f64 {
        if wdf == 0 {
            return 0.0;
        }
        let tf = wdf as f64;
        let doc_len = doc_len.max(1) as f64;
        let numerator = self.idf * tf * (self.k1 + 1.0);
        let denominator =
            tf + self.k1 * (1.0 - self.b + self.b * (doc_len / self.average_length));
        numerator / denominator
    }
}

impl Weight for Bm25Weight {
    fn score(&self, wdf: TermCount, doc_len: TermCount) -> f64 {
        self.multiplier * self.bm25(wdf, doc_len)
    }

    fn max_score(&self) -> f64 {
        self.multiplier * self.bm25(self.wdf_upper.max(1), self.doc_length_lower)
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
